use std::path::PathBuf;
use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Templates {
    pub dev_mode: Option<bool>,
    pub directory: Option<PathBuf>
}

#[derive(Debug, Deserialize)]
pub struct Db {
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dbname: Option<String>,
    pub max_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct Session {
    pub cookie: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Sec {
    pub session: Option<Session>,
}

#[derive(Debug, Deserialize)]
pub struct Email {
    pub default_locale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Listener {
    pub addr: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub listeners: Option<HashMap<String, Listener>>,

    pub templates: Option<Templates>,
    pub email: Option<Email>,

    pub sec: Option<Sec>,
    pub db: Option<Db>,
}
