//! Human-readable rendering of an audit report.

use ipr_audit_core::models::AuditReport;

use crate::style;

fn joined<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// One `Found N <kind>: a,b,c` line per collected set.
pub fn summary_lines(report: &AuditReport) -> Vec<String> {
    let sets = &report.sets;
    vec![
        format!("Found {} authors: {}", report.authors.len(), joined(&report.authors)),
        format!("Found {} delegates: {}", sets.delegates.len(), joined(&sets.delegates)),
        format!("Found {} emeriti: {}", sets.emeriti.len(), joined(&sets.emeriti)),
        format!("Found {} usernames: {}", sets.signers.len(), joined(&sets.signers)),
    ]
}

/// The closing line: the uncovered authors, or confirmation that none are.
pub fn verdict_line(report: &AuditReport) -> String {
    if report.uncovered.is_empty() {
        "All authors have signed the form, or are delegates or emeriti!".to_string()
    } else {
        format!(
            "Missing {} authors: {}",
            report.uncovered.len(),
            report.uncovered.join(",")
        )
    }
}

/// Print the summary to stdout and the verdict to stdout or stderr.
pub fn print_report(report: &AuditReport) {
    for line in summary_lines(report) {
        println!("{}", style::dim(&line));
    }
    println!();
    if report.uncovered.is_empty() {
        println!("{}", style::success(&verdict_line(report)));
    } else {
        eprintln!("{}", style::error(&verdict_line(report)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipr_audit_core::models::AuthorizationSets;

    fn report(uncovered: &[&str]) -> AuditReport {
        let mut sets = AuthorizationSets::default();
        sets.delegates.insert("bob".into());
        sets.delegates.insert("alice".into());
        sets.signers.insert("carol".into());
        AuditReport {
            revision: "abc1234".into(),
            authors: vec!["Carol".into(), "bob".into(), "mallory".into()],
            sets,
            uncovered: uncovered.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_summary_lines() {
        let lines = summary_lines(&report(&[]));
        assert_eq!(lines[0], "Found 3 authors: Carol,bob,mallory");
        assert_eq!(lines[1], "Found 2 delegates: alice,bob");
        assert_eq!(lines[2], "Found 0 emeriti: ");
        assert_eq!(lines[3], "Found 1 usernames: carol");
    }

    #[test]
    fn test_verdict_line() {
        assert_eq!(
            verdict_line(&report(&[])),
            "All authors have signed the form, or are delegates or emeriti!"
        );
        assert_eq!(
            verdict_line(&report(&["mallory", "trudy"])),
            "Missing 2 authors: mallory,trudy"
        );
    }
}
