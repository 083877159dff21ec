use std::process::{Command, Stdio};

/// Opens URLs on behalf of the form's `Help` menu.
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str);
}

/// Opens URLs with the platform's default browser.
///
/// The opener process is spawned and not waited for; failures are only
/// logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl SystemBrowser {
    fn command(url: &str) -> Command {
        match std::env::consts::OS {
            "windows" => {
                let mut command = Command::new("cmd");
                command.args(["/C", "start", "", url]);
                command
            }
            "macos" => {
                let mut command = Command::new("open");
                command.arg(url);
                command
            }
            _ => {
                let mut command = Command::new("xdg-open");
                command.arg(url);
                command
            }
        }
    }
}

impl LinkOpener for SystemBrowser {
    fn open(&self, url: &str) {
        let spawned = Self::command(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(_) => debug!("opening {url}"),
            Err(e) => warn!("failed to open {url}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_carries_url() {
        let command = SystemBrowser::command("https://example.org");
        let args: Vec<_> = command.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args.last().map(String::as_str), Some("https://example.org"));
    }
}
