//! Structured crash reports.
//!
//! On panic, report the phase and device being processed, how many devices
//! had finished, and where the panic was raised.

use super::context::{get_current_context, get_progress, AnalysisContext};
use std::panic::PanicHookInfo;
use tracing::Span;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const WIDTH: usize = 76;

/// Install the crash-report hook. Call once, early in `main`.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!();
        eprintln!("{}", render_crash_report(info, &get_current_context(), get_progress()));
    }));
}

fn render_crash_report(
    info: &PanicHookInfo<'_>,
    context: &AnalysisContext,
    (processed, total): (usize, usize),
) -> String {
    let mut lines = vec![
        rule('╔', '╗'),
        row(&format!("{:^width$}", "MAUDE-RISK CRASH REPORT", width = WIDTH)),
        rule('╠', '╣'),
        row(&format!("Version: {VERSION}")),
        row(&format!("Platform: {}", std::env::consts::OS)),
        row(&format!(
            "Time: {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        )),
        rule('╠', '╣'),
        row(&format!("PANIC: {}", panic_message(info))),
    ];
    if let Some(location) = info.location() {
        lines.push(row(&format!(
            "Location: {}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        )));
    }

    lines.push(rule('╠', '╣'));
    lines.extend(context_rows(context, processed, total));
    lines.push(rule('╠', '╣'));
    if std::env::var("RUST_BACKTRACE").is_ok() {
        lines.push(row("STACK TRACE:"));
        lines.push(rule('╚', '╝'));
        lines.push(std::backtrace::Backtrace::capture().to_string());
    } else {
        lines.push(row("Run with RUST_BACKTRACE=1 for stack trace"));
        lines.push(rule('╚', '╝'));
    }
    lines.join("\n")
}

fn context_rows(context: &AnalysisContext, processed: usize, total: usize) -> Vec<String> {
    let mut rows = vec![row("OPERATION CONTEXT:")];
    rows.push(row(&match &context.phase {
        Some(phase) => format!("  Phase: {phase}"),
        None => "  Phase: (not set - crash occurred before analysis started)".to_string(),
    }));
    if let Some(metadata) = Span::current().metadata() {
        rows.push(row(&format!("  Span: {}", metadata.name())));
    }
    if let Some(device) = &context.current_device {
        rows.push(row(&format!("  Device: {device}")));
    }
    if total > 0 {
        let pct = processed * 100 / total;
        rows.push(row(&format!("  Progress: {processed} / {total} devices ({pct}%)")));
    }
    rows
}

fn rule(left: char, right: char) -> String {
    format!("{left}{}{right}", "═".repeat(WIDTH + 2))
}

fn row(text: &str) -> String {
    format!("║ {:<width$} ║", truncate(text, WIDTH), width = WIDTH)
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::AnalysisPhase;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        let long = truncate("this is a long string that needs truncation", 20);
        assert_eq!(long.chars().count(), 20);
        assert!(long.ends_with("..."));
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("Dispositivo médico", 18), "Dispositivo médico");
    }

    #[test]
    fn test_context_rows_name_device_and_progress() {
        let context = AnalysisContext {
            phase: Some(AnalysisPhase::Scoring),
            current_device: Some("Essure".to_string()),
        };
        let rows = context_rows(&context, 3, 4).join("\n");
        assert!(rows.contains("Phase: scoring"));
        assert!(rows.contains("Device: Essure"));
        assert!(rows.contains("3 / 4 devices (75%)"));
    }

    #[test]
    fn test_rows_have_fixed_width() {
        assert_eq!(row("x").chars().count(), rule('╔', '╗').chars().count());
    }
}
