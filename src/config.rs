use std::collections::HashMap;
use std::path::{Path, PathBuf, Component};
use std::str::FromStr;
use std::net::{SocketAddr, IpAddr};
use std::default::Default;
use std::fmt::{Display, Formatter};

use clap::Parser;

use crate::error::{self, Context};

mod shape;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Parser)]
#[command(author, version ,about, long_about = None)]
pub struct CliArgs {
    /// a config file to load, may be given multiple times. later files
    /// override earlier ones
    #[arg(long)]
    config: Vec<PathBuf>
}

#[derive(Debug)]
pub struct Config {
    pub settings: Settings,
}

pub fn get_config() -> error::Result<Config> {
    Config::from_args(CliArgs::parse())
}

impl Config {
    pub fn from_args(args: CliArgs) -> error::Result<Self> {
        let cwd = std::env::current_dir()
            .context("failed to retrieve cwd for Settings")?;
        let mut settings = Settings::default();

        for config_path in args.config {
            let full = if config_path.is_absolute() {
                config_path
            } else {
                normalize(cwd.join(config_path))
            };

            tracing::debug!("loading config file \"{}\"", full.display());

            let loaded = Self::load_file(&full)?;
            let src = SrcFile::new(&full)?;
            let dot = DotPath::new(&"settings");

            settings.merge(&src, dot, loaded)?;
        }

        if settings.listeners.is_empty() {
            settings.listeners.insert(String::from("default"), Listener::default());
        }

        tracing::debug!("{settings:#?}");

        Ok(Config {
            settings,
        })
    }

    fn load_file(path: &Path) -> error::Result<shape::Settings> {
        let ext = path.extension().context(format!(
            "failed to retrieve the file extension for config file: \"{}\"", path.display()
        ))?;

        let ext = ext.to_ascii_lowercase();
        let file = std::fs::OpenOptions::new()
            .read(true)
            .open(path)
            .context(format!("failed to open config file: \"{}\"", path.display()))?;
        let reader = std::io::BufReader::new(file);

        if ext.eq("yaml") || ext.eq("yml") {
            serde_yaml::from_reader(reader).context(format!(
                "failed to parse yaml config file: \"{}\"", path.display()
            ))
        } else if ext.eq("json") {
            serde_json::from_reader(reader).context(format!(
                "failed to parse json config file: \"{}\"", path.display()
            ))
        } else {
            Err(error::Error::from(format!(
                "unknown type of config file: \"{}\"", path.display()
            )))
        }
    }
}

struct SrcFile<'a> {
    parent: &'a Path,
    src: &'a Path,
}

impl<'a> SrcFile<'a> {
    fn new(src: &'a Path) -> error::Result<Self> {
        let parent = src.parent().context(format!(
            "failed to retrieve parent path from source file \"{}\"", src.display()
        ))?;

        Ok(SrcFile {
            parent,
            src
        })
    }
}

impl<'a> Display for SrcFile<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.src.display())
    }
}

struct Quote<'a>(&'a dyn Display);

impl<'a> Display for Quote<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

/// location of a value in the settings tree, used in error messages
struct DotPath<'a>(Vec<&'a dyn Display>);

impl<'a> DotPath<'a> {
    fn new(name: &'a (dyn Display)) -> Self {
        DotPath(vec![name])
    }

    fn push(&self, name: &'a (dyn Display)) -> Self {
        let mut path = self.0.clone();
        path.push(name);

        DotPath(path)
    }
}

impl<'a> Display for DotPath<'a> {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        let mut iter = self.0.iter();

        if let Some(first) = iter.next() {
            write!(fmt, "{first}")?;
        }

        for name in iter {
            write!(fmt, ".{name}")?;
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Settings {
    pub listeners: HashMap<String, Listener>,
    pub templates: Templates,
    pub email: Email,
    pub sec: Sec,
    pub db: Db,
}

impl Settings {
    fn merge(&mut self, src: &SrcFile<'_>, dot: DotPath<'_>, settings: shape::Settings) -> error::Result<()> {
        if let Some(listeners) = settings.listeners {
            for (key, listener) in listeners {
                let found = self.listeners.entry(key.clone())
                    .or_insert_with(Listener::default);

                found.merge(src, dot.push(&"listeners").push(&Quote(&key)), listener)?;
            }
        }

        if let Some(templates) = settings.templates {
            self.templates.merge(src, dot.push(&"templates"), templates)?;
        }

        if let Some(email) = settings.email {
            self.email.merge(src, dot.push(&"email"), email)?;
        }

        if let Some(sec) = settings.sec {
            self.sec.merge(src, dot.push(&"sec"), sec)?;
        }

        if let Some(db) = settings.db {
            self.db.merge(src, dot.push(&"db"), db)?;
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct Listener {
    pub addr: SocketAddr,
}

impl Listener {
    fn merge(&mut self, src: &SrcFile<'_>, dot_path: DotPath<'_>, listener: shape::Listener) -> error::Result<()> {
        self.addr = match SocketAddr::from_str(&listener.addr) {
            Ok(valid) => valid,
            Err(_) => match IpAddr::from_str(&listener.addr) {
                Ok(valid) => SocketAddr::from((valid, DEFAULT_PORT)),
                Err(err) => {
                    return Err(error::Error::Context {
                        cxt: format!("{dot_path}.addr invalid: \"{}\" file: {src}", listener.addr),
                        src: Box::new(err),
                    });
                }
            }
        };

        Ok(())
    }
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
        }
    }
}

#[derive(Debug, Default)]
pub struct Templates {
    pub dev_mode: bool,

    /// overrides for the built in templates
    pub directory: Option<PathBuf>,
}

impl Templates {
    fn merge(&mut self, src: &SrcFile<'_>, dot_path: DotPath<'_>, templates: shape::Templates) -> error::Result<()> {
        if let Some(dev_mode) = templates.dev_mode {
            self.dev_mode = dev_mode;
        }

        if let Some(directory) = templates.directory {
            self.directory = Some(check_dir(directory, src, dot_path.push(&"directory"))?);
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct Email {
    pub default_locale: String,
}

impl Email {
    fn merge(&mut self, _src: &SrcFile<'_>, _dot: DotPath<'_>, email: shape::Email) -> error::Result<()> {
        if let Some(default_locale) = email.default_locale {
            self.default_locale = default_locale;
        }

        Ok(())
    }
}

impl Default for Email {
    fn default() -> Self {
        Email {
            default_locale: String::from("en-UK"),
        }
    }
}

#[derive(Debug, Default)]
pub struct Sec {
    pub session: Session,
}

impl Sec {
    fn merge(&mut self, src: &SrcFile<'_>, dot: DotPath<'_>, sec: shape::Sec) -> error::Result<()> {
        if let Some(session) = sec.session {
            self.session.merge(src, dot.push(&"session"), session)?;
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct Session {
    pub cookie: String,
}

impl Session {
    fn merge(&mut self, src: &SrcFile<'_>, dot: DotPath<'_>, session: shape::Session) -> error::Result<()> {
        if let Some(cookie) = session.cookie {
            if cookie.is_empty() || cookie.contains(|c: char| c == '=' || c == ';' || c.is_whitespace()) {
                return Err(error::Error::from(format!(
                    "{}.cookie invalid: \"{cookie}\" file: {src}", dot
                )));
            }

            self.cookie = cookie;
        }

        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Session {
            cookie: String::from("session_id"),
        }
    }
}

#[derive(Debug)]
pub struct Db {
    pub user: String,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub max_size: Option<usize>,
}

impl Db {
    fn merge(&mut self, _src: &SrcFile<'_>, _dot: DotPath<'_>, db: shape::Db) -> error::Result<()> {
        if let Some(user) = db.user {
            self.user = user;
        }

        if let Some(password) = db.password {
            self.password = Some(password);
        }

        if let Some(host) = db.host {
            self.host = host;
        }

        if let Some(port) = db.port {
            self.port = port;
        }

        if let Some(dbname) = db.dbname {
            self.dbname = dbname;
        }

        if let Some(max_size) = db.max_size {
            self.max_size = Some(max_size);
        }

        Ok(())
    }
}

impl Default for Db {
    fn default() -> Self {
        Db {
            user: "postgres".into(),
            password: None,
            host: "localhost".into(),
            port: 5432,
            dbname: "lockbox".into(),
            max_size: None,
        }
    }
}

/// resolves `..` and `.` without touching the file system
fn normalize<P>(path: P) -> PathBuf
where
    P: AsRef<Path>
{
    path.as_ref()
        .components()
        .fold(PathBuf::new(), |mut rtn, comp| {
            match comp {
                Component::ParentDir => {
                    rtn.pop();
                },
                Component::CurDir => {},
                other => rtn.push(other.as_os_str()),
            }

            rtn
        })
}

fn check_dir(given: PathBuf, src: &SrcFile<'_>, dot: DotPath<'_>) -> error::Result<PathBuf> {
    let full = if given.is_absolute() {
        given
    } else {
        normalize(src.parent.join(given))
    };

    tracing::debug!("{dot} {src} checking {}", full.display());

    let meta = match std::fs::metadata(&full) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(error::Error::from(format!("{dot} {src} was not found")));
        },
        Err(err) => {
            return Err(error::Error::Context {
                cxt: format!("{dot} failed to retrieve metadata for: {src}"),
                src: Box::new(err),
            });
        }
    };

    if !meta.is_dir() {
        return Err(error::Error::from(format!("{dot} is not a directory in: {src}")));
    }

    Ok(full)
}
