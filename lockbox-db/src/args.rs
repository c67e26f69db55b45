pub mod db {
    use clap::{Arg, ArgAction, value_parser};

    const SEPARATE: [&str; 6] = ["user", "password", "req_password", "host", "port", "dbname"];

    /// a full connection string, replaces every other connection argument
    pub fn connect() -> Arg {
        Arg::new("connect")
            .short('c')
            .long("connect")
            .action(ArgAction::Set)
            .help("postgres connection string, e.g. \"host=localhost user=postgres dbname=lockbox\"")
            .conflicts_with_all(SEPARATE)
    }

    fn separate(name: &'static str, long: &'static str, help: &'static str) -> Arg {
        Arg::new(name)
            .long(long)
            .action(ArgAction::Set)
            .help(help)
            .conflicts_with("connect")
    }

    pub fn user() -> Arg {
        separate("user", "user", "postgres user")
            .short('u')
            .default_value("postgres")
    }

    pub fn password() -> Arg {
        separate("password", "password", "postgres password")
            .short('P')
            .conflicts_with("req_password")
    }

    pub fn req_password() -> Arg {
        Arg::new("req_password")
            .long("req-password")
            .action(ArgAction::SetTrue)
            .help("prompts for the postgres password before connecting")
            .conflicts_with_all(["connect", "password"])
    }

    pub fn host() -> Arg {
        separate("host", "host", "postgres host")
            .default_value("localhost")
    }

    pub fn port() -> Arg {
        separate("port", "port", "postgres port")
            .short('p')
            .default_value("5432")
            .value_parser(value_parser!(u16))
    }

    pub fn dbname() -> Arg {
        separate("dbname", "dbname", "postgres database name")
            .default_value("lockbox")
    }
}
