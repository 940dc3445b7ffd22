//! Terminal shell for the race-winners form.
//!
//! # Responsibility
//! - Open the store before showing anything; exit when that fails.
//! - Render rows, filters, the edit form and the status line.
//! - Forward typed commands to the core intent table.
//! - Release the store connection on exit.

use log::{error, info};
use motogp_core::{
    core_version, delete_prompt, init_logging, open_failure_notice, AppConfig, FormController,
    FormError, FormState, Intent, Notice, RaceClass, RaceWinnerKey, RaceWinnerRepository,
    Severity, SqliteRaceWinnerRepository, INTENT_TABLE,
};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = AppConfig::from_env();
    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let mut controller = match start_controller(&config) {
        Ok(controller) => controller,
        Err(notice) => {
            eprintln!("{}", format_notice(&notice));
            return ExitCode::from(1);
        }
    };
    info!("event=cli_start module=cli status=ok version={}", core_version());

    let stdin = io::stdin();
    let stdout = io::stdout();
    let shell_result = run_shell(&mut controller, stdin.lock(), stdout.lock());

    let close_result = controller.close();
    info!("event=cli_exit module=cli status=ok");

    match (shell_result, close_result) {
        (Ok(()), Ok(())) => ExitCode::SUCCESS,
        (Err(err), _) => {
            eprintln!("terminal error: {err}");
            ExitCode::from(1)
        }
        (_, Err(err)) => {
            eprintln!("{}", format_notice(&err.notice()));
            ExitCode::from(1)
        }
    }
}

/// Opens the configured store and loads the first page of rows.
///
/// Any failure here is fatal for the shell; the returned notice is shown
/// before exiting.
fn start_controller(
    config: &AppConfig,
) -> Result<FormController<SqliteRaceWinnerRepository>, Notice> {
    let repo = SqliteRaceWinnerRepository::open(&config.db_path).map_err(|err| {
        error!("event=cli_start module=cli status=error error_code=db_open_failed");
        open_failure_notice(&err)
    })?;

    let mut controller = FormController::new(repo);
    if let Err(err) = controller.reload() {
        error!("event=cli_start module=cli status=error error_code=initial_load_failed");
        return Err(err.notice());
    }
    Ok(controller)
}

/// Reads commands until `quit` or end of input.
fn run_shell<R, W, S>(
    controller: &mut FormController<S>,
    mut input: R,
    mut output: W,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    S: RaceWinnerRepository,
{
    writeln!(output, "Moto GP race winners {} (type `help`)", core_version())?;
    render(controller, &mut output)?;

    loop {
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let line = line.trim_end_matches(['\n', '\r']);
        let (name, arg) = split_command(line);

        match name {
            "" => continue,
            "quit" | "exit" => return Ok(()),
            "help" => {
                write_help(&mut output)?;
                continue;
            }
            "show" => {
                render(controller, &mut output)?;
                continue;
            }
            _ => {}
        }

        let intent = match Intent::parse(name, arg) {
            Ok(intent) => intent,
            Err(err) => {
                writeln!(output, "{err}")?;
                continue;
            }
        };
        let shows_table = !matches!(intent, Intent::Set(..));

        let result = controller.dispatch(intent, |key| {
            confirm_delete(&mut input, &mut output, key).unwrap_or(false)
        });
        report(&result, &mut output)?;
        if shows_table {
            render(controller, &mut output)?;
        }
    }
}

fn split_command(line: &str) -> (&str, &str) {
    let trimmed = line.trim_start();
    match trimmed.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim_start()),
        None => (trimmed, ""),
    }
}

fn confirm_delete(
    input: &mut impl BufRead,
    output: &mut impl Write,
    key: &RaceWinnerKey,
) -> io::Result<bool> {
    write!(output, "{} [y/N] ", delete_prompt(key))?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}

fn report(result: &Result<Option<Notice>, FormError>, output: &mut impl Write) -> io::Result<()> {
    match result {
        Ok(Some(notice)) => writeln!(output, "{}", format_notice(notice)),
        Ok(None) => Ok(()),
        Err(err) => writeln!(output, "{}", format_notice(&err.notice())),
    }
}

fn format_notice(notice: &Notice) -> String {
    let marker = match notice.severity {
        Severity::Info => "i",
        Severity::Warning => "!",
        Severity::Critical => "x",
    };
    format!("[{marker}] {}: {}", notice.title, notice.message)
}

fn write_help(output: &mut impl Write) -> io::Result<()> {
    writeln!(output, "commands:")?;
    for spec in INTENT_TABLE {
        writeln!(output, "  {:<8} {}", spec.name, spec.help)?;
    }
    writeln!(output, "  {:<8} redraw the table and form", "show")?;
    writeln!(output, "  {:<8} leave the shell", "quit")?;
    let classes = RaceClass::ALL
        .iter()
        .map(|class| class.label())
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(output, "classes: {classes}")
}

fn render<S: RaceWinnerRepository>(
    controller: &FormController<S>,
    output: &mut impl Write,
) -> io::Result<()> {
    writeln!(
        output,
        "search: \"{}\"  class: {}  (classes: {})",
        controller.search_text(),
        controller.class_filter(),
        controller.class_options().join(", ")
    )?;
    writeln!(
        output,
        "{:>3}  {:>6}  {:<32} {:<7} {:<24} {:<14} {}",
        "#", "Season", "Circuit", "Class", "Rider", "Constructor", "Country"
    )?;
    for (index, row) in controller.rows().iter().enumerate() {
        writeln!(
            output,
            "{:>3}  {:>6}  {:<32} {:<7} {:<24} {:<14} {}",
            index,
            row.season,
            row.circuit,
            row.class.label(),
            row.rider,
            row.constructor,
            row.country
        )?;
    }

    let fields = controller.fields();
    let mode = match controller.state() {
        FormState::Empty => "new entry".to_string(),
        FormState::Loaded(key) => format!("editing {key}"),
    };
    writeln!(output, "form ({mode}):")?;
    writeln!(
        output,
        "  season={} circuit={} class={} rider={} constructor={} country={}",
        fields.season,
        fields.circuit,
        fields.class,
        fields.rider,
        fields.constructor,
        fields.country
    )?;
    writeln!(output, "status: {}", controller.status())
}
