use std::path::{Path, PathBuf};

use clap::ArgMatches;

use crate::error;
use crate::conn;

/// sql files in the directory, ordered by file name
fn sql_files(dir: &Path) -> error::Result<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(dir).map_err(|src| error::Error::File {
        path: dir.display().to_string(),
        src,
    })?;

    let mut files = Vec::new();

    for entry in read_dir {
        let path = entry?.path();

        if path.is_file() && path.extension().map(|ext| ext == "sql").unwrap_or(false) {
            files.push(path);
        }
    }

    files.sort();

    Ok(files)
}

pub async fn run(args: &ArgMatches) -> error::Result<()> {
    let setup_dir = match args.get_one::<PathBuf>("dir") {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?.join("lockbox-db/setup/postgres"),
    };

    let files = sql_files(&setup_dir)?;
    let mut conn = conn::postgres(args).await?;
    let transaction = conn.transaction().await?;

    for path in files {
        let file_sql = std::fs::read_to_string(&path).map_err(|src| error::Error::File {
            path: path.display().to_string(),
            src,
        })?;

        tracing::info!("running {}", path.display());

        // dropping the transaction on error rolls it back
        transaction.batch_execute(&file_sql).await.map_err(|src| error::Error::Query {
            path: path.display().to_string(),
            sql: file_sql.clone(),
            src,
        })?;
    }

    if args.get_flag("rollback") {
        tracing::info!("rolling back changes");

        transaction.rollback().await?;
    } else {
        transaction.commit().await?;
    }

    Ok(())
}
