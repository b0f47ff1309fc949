use tierkeep::core::{PolicyConfig, RetentionResult, Tier};

fn reasons_label(reasons: &std::collections::BTreeSet<Tier>) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_result(result: &RetentionResult) -> String {
    let mut lines = vec![format!(
        "◆ {}{}",
        result.target.display(),
        if result.dry_run { " (dry run)" } else { "" }
    )];

    for kept in &result.keep {
        lines.push(format!(
            "  keep   {}  {}  [{}]",
            kept.item.timestamp().format("%Y-%m-%d %H:%M:%S"),
            kept.item.path().display(),
            reasons_label(&kept.reasons)
        ));
    }

    let verb = if result.dry_run { "would prune" } else { "pruned" };
    for item in &result.prune {
        lines.push(format!(
            "  prune  {}  {}",
            item.timestamp().format("%Y-%m-%d %H:%M:%S"),
            item.path().display()
        ));
    }

    let elapsed = (result.finished_at - result.started_at).num_milliseconds();
    lines.push(format!(
        "  {} kept, {} {verb} in {elapsed} ms",
        result.keep.len(),
        result.prune.len()
    ));
    lines.join("\n")
}

pub fn render_policy(policy: &PolicyConfig) -> String {
    Tier::ALL
        .into_iter()
        .map(|tier| format!("{:<13} {}", tier.option_name(), policy.count(tier)))
        .collect::<Vec<_>>()
        .join("\n")
}
