use console::{style, StyledObject};
use std::path::Path;
use std::process::{ExitStatus, Output};

pub(crate) async fn wait_for_child(mut child: tokio::process::Child) -> Result<(ExitStatus, ()), std::io::Error> {
    child.wait().await.map(|status| (status, ()))
}

pub(crate) async fn wait_for_child_output(child: tokio::process::Child) -> Result<(ExitStatus, Output), std::io::Error> {
    child.wait_with_output().await.map(|output| (output.status, output))
}

#[derive(Debug)]
pub(crate) struct CommandContext<T> {
    pub(crate) exit_status: ExitStatus,
    pub(crate) result: T,
}

fn separator() -> &'static str {
    static SEPARATOR: once_cell::sync::OnceCell<String> = once_cell::sync::OnceCell::new();

    SEPARATOR.get_or_init(|| {
        let width = match console::Term::stdout().size_checked() {
            Some((_, width)) => width as usize,
            None => 80,
        };
        "=".repeat(width)
    })
}

/// Run a child command between two banners so its own output is clearly delimited from ours.
pub(crate) async fn wrap_command_print_context<Ret, RetFut, RetFutErr>(
    full_command: &[impl AsRef<str>],
    work_dir: &Path,
    user_settings: impl FnOnce(&mut tokio::process::Command) -> &mut tokio::process::Command,
    extract: impl FnOnce(tokio::process::Child) -> RetFut,
) -> Result<CommandContext<Ret>, anyhow::Error>
where
    RetFut: Future<Output = Result<(ExitStatus, Ret), RetFutErr>>,
    RetFutErr: std::error::Error + Send + Sync + 'static,
{
    let full_command = full_command.iter().map(AsRef::as_ref).collect::<Vec<_>>();
    let Some((program, args)) = full_command.split_first() else {
        anyhow::bail!("Refusing to execute an empty command");
    };
    let separator = separator();

    println!();
    println!("{}", style(separator).cyan());
    println!("Entering command context.");
    println!("Executing: ['{}']", full_command.join("', '"));
    println!("{}", style(separator).cyan());
    println!();

    let mut command = tokio::process::Command::new(program);
    command.args(args);
    command.current_dir(work_dir);
    command.kill_on_drop(true);
    user_settings(&mut command);

    let child = command.spawn()?;
    let (exit_status, result) = extract(child).await?;

    let message: StyledObject<String> = match exit_status.code() {
        Some(code) if exit_status.success() => style(format!("Command returned exit code {code}.")).green(),
        Some(code) => style(format!("Command returned exit code {code}.")).red(),
        None => style("Command was terminated by signal.".to_string()).red(),
    };

    println!();
    println!("{}", style(separator).yellow());
    println!("Returned to tty context.");
    println!("{message}");
    println!("{}", style(separator).yellow());
    println!();

    Ok(CommandContext { exit_status, result })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_exit_status_of_child() {
        let dir = tempfile::tempdir().unwrap();

        let ok = wrap_command_print_context(&["true"], dir.path(), |cmd| cmd, wait_for_child).await.unwrap();
        assert!(ok.exit_status.success());

        let failed = wrap_command_print_context(&["false"], dir.path(), |cmd| cmd, wait_for_child).await.unwrap();
        assert!(!failed.exit_status.success());
    }

    #[tokio::test]
    async fn captures_output_when_piped() {
        let dir = tempfile::tempdir().unwrap();
        let context = wrap_command_print_context(
            &["sh", "-c", "echo hello"],
            dir.path(),
            |cmd| cmd.stdout(std::process::Stdio::piped()),
            wait_for_child_output,
        )
        .await
        .unwrap();
        assert_eq!(String::from_utf8_lossy(&context.result.stdout).trim(), "hello");
    }

    #[tokio::test]
    async fn empty_command_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let empty: [&str; 0] = [];
        assert!(wrap_command_print_context(&empty, dir.path(), |cmd| cmd, wait_for_child).await.is_err());
    }
}
