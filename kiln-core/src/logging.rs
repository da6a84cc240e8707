use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Console plus persistent file, every line written to both.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        self.file.flush()
    }
}

pub fn init_with(log_file: Option<&Path>) {
    use env_logger::{Env, Target};

    // If the log file cannot be created (permissions, readonly FS, etc.), fall
    // back to the console alone.
    let target = log_file
        .and_then(|path| {
            (|| -> io::Result<Target> {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                let file = fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                Ok(Target::Pipe(Box::new(Tee { file })))
            })()
            .ok()
        })
        .unwrap_or(Target::Stdout);

    let result = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(target)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}][{}][{}]: {}",
                buf.timestamp_seconds(),
                record.target(),
                record.level(),
                record.args()
            )
        })
        .try_init();
    if result.is_err() {
        log::debug!("logger already initialised");
    }
}
