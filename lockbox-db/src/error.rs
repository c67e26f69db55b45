#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown command \"{0}\"")]
    UnknownCommand(String),

    #[error("missing argument \"{0}\"")]
    MissingArg(&'static str),

    #[error("{path}: {src}")]
    File {
        path: String,
        #[source]
        src: std::io::Error,
    },

    #[error("error running query from {path}. {src}\n{sql}")]
    Query {
        path: String,
        sql: String,
        #[source]
        src: tokio_postgres::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Postgres(#[from] tokio_postgres::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
