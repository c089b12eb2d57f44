use std::path::PathBuf;

use clap::Parser;

/// DATA 404: static site server with a password-gated download.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Address to bind the web server to.
    #[arg(long, default_value = "127.0.0.1", env = "DATA404_BIND")]
    pub bind: String,

    /// Port to listen on.
    #[arg(long, default_value = "8000", env = "DATA404_PORT")]
    pub port: u16,

    /// Directory served for every non-API path.
    #[arg(long, default_value = ".", env = "DATA404_ROOT")]
    pub root: PathBuf,

    /// JSON user store. Created as an empty document if missing.
    #[arg(long, default_value = "users.json", env = "DATA404_USERS_FILE")]
    pub users_file: PathBuf,

    /// Link handed out on every successful login.
    #[arg(long, default_value = "dist/DATA404.exe", env = "DATA404_DOWNLOAD_LINK")]
    pub download_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cli = Cli::try_parse_from(["data404"]).expect("defaults should parse");
        assert_eq!(cli.bind, "127.0.0.1");
        assert_eq!(cli.port, 8000);
        assert_eq!(cli.root, PathBuf::from("."));
        assert_eq!(cli.users_file, PathBuf::from("users.json"));
        assert_eq!(cli.download_link, "dist/DATA404.exe");
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "data404",
            "--port",
            "9090",
            "--root",
            "site",
            "--download-link",
            "https://example.com/file.zip",
        ])
        .expect("flags should parse");
        assert_eq!(cli.port, 9090);
        assert_eq!(cli.root, PathBuf::from("site"));
        assert_eq!(cli.download_link, "https://example.com/file.zip");
    }
}
