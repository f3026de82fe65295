//! Diff preview of a generation plan

use std::fmt::Write;

use console::style;
use django_codegen::generator::{Plan, PlannedArtifact, PlannedOutcome, Report, Status, Summary};
use similar::{ChangeTag, TextDiff};

const CONTEXT_LINES: usize = 3;

/// Render every planned artifact with a unified diff of its changes
#[must_use]
pub fn render_plan(plan: &Plan) -> String {
    let mut out = String::new();
    for artifact in plan.artifacts() {
        render_artifact(&mut out, artifact);
    }
    out
}

fn render_artifact(out: &mut String, artifact: &PlannedArtifact) {
    let path = artifact
        .path
        .as_ref()
        .map_or_else(|| "<unresolved>".to_string(), |p| p.display().to_string());

    match &artifact.outcome {
        PlannedOutcome::Create => {
            let _ = writeln!(out, "{} {} {}", style(artifact.kind).bold(), path, style("(new file)").green());
        }
        PlannedOutcome::Update => {
            let _ = writeln!(out, "{} {} {}", style(artifact.kind).bold(), path, style("(update)").yellow());
        }
        PlannedOutcome::Unchanged => {
            let _ = writeln!(out, "{} {} {}", style(artifact.kind).bold(), path, style("(unchanged)").dim());
            return;
        }
        PlannedOutcome::Failed(err) => {
            let _ = writeln!(out, "{} {} {}", style(artifact.kind).bold(), path, style(format!("(failed: {err})")).red());
            return;
        }
    }

    let before = artifact.before.as_deref().unwrap_or("");
    let after = artifact.after.as_deref().unwrap_or("");
    render_diff(out, before, after);
    out.push('\n');
}

fn render_diff(out: &mut String, before: &str, after: &str) {
    let diff = TextDiff::from_lines(before, after);
    for hunk in diff.unified_diff().context_radius(CONTEXT_LINES).iter_hunks() {
        let _ = writeln!(out, "{}", style(hunk.header()).cyan());
        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => style(format!("-{change}")).red().to_string(),
                ChangeTag::Insert => style(format!("+{change}")).green().to_string(),
                ChangeTag::Equal => format!(" {change}"),
            };
            out.push_str(&line);
            if change.missing_newline() {
                out.push('\n');
            }
        }
    }
}

/// One line per artifact outcome
#[must_use]
pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    for report in summary.reports() {
        let _ = writeln!(out, "{}", report_line(report));
    }
    out
}

fn report_line(report: &Report) -> String {
    let path = report
        .path
        .as_ref()
        .map_or_else(|| report.kind.to_string(), |p| p.display().to_string());
    match &report.status {
        Status::Created => format!("  {} {path}", style("created").green().bold()),
        Status::Updated => format!("  {} {path}", style("updated").yellow().bold()),
        Status::Unchanged => format!("  {} {path}", style("unchanged").dim()),
        Status::Failed(err) => format!("  {} {path}: {err}", style("failed").red().bold()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use django_codegen::generator::{Generator, MemoryStore, NoopFormatter};
    use django_codegen::scaffold::{ArtifactKind, EntityBuilder};
    use django_codegen::GeneratorConfig;

    fn plan(store: &MemoryStore, tokens: &[&str]) -> Plan {
        console::set_colors_enabled(false);
        let config = GeneratorConfig {
            app: "blog".to_string(),
            ..GeneratorConfig::default()
        };
        let mut builder = EntityBuilder::new("Blog", &config).unwrap();
        for token in tokens {
            builder.add_token(token).unwrap();
        }
        let entity = builder.build().unwrap();
        Generator::new(&config, store.clone(), NoopFormatter)
            .unwrap()
            .plan(&entity, &[ArtifactKind::Definition])
            .unwrap()
    }

    #[test]
    fn test_new_file_is_shown_as_insertions() {
        let store = MemoryStore::new();
        let rendered = render_plan(&plan(&store, &["title:ShortText"]));

        assert!(rendered.starts_with("definition blog/models.py (new file)\n"));
        assert!(rendered.contains("+from django.db import models\n"));
        assert!(rendered.contains("+    title = models.CharField(max_length=250)\n"));
        assert!(!rendered.contains("\n-"));
    }

    #[test]
    fn test_update_shows_only_nearby_context() {
        let existing = "from django.db import models\n\n\nclass Blog(models.Model):\n    a = models.IntegerField()\n    b = models.IntegerField()\n    c = models.IntegerField()\n    d = models.IntegerField()\n    e = models.IntegerField()\n";
        let store = MemoryStore::with_files([("blog/models.py", existing)]);
        let rendered = render_plan(&plan(&store, &["f:Integer"]));

        assert!(rendered.contains("(update)"));
        assert!(rendered.contains("@@ "));
        assert!(rendered.contains("    e = models.IntegerField()\n+    f = models.IntegerField()\n"));
        assert!(!rendered.contains("from django.db import models"));
    }

    #[test]
    fn test_unchanged_and_failed_have_no_diff() {
        let existing = "from django.db import models\n\n\nclass Blog(models.Model):\n    title = models.TextField()\n";
        let store = MemoryStore::with_files([("blog/models.py", existing)]);
        let rendered = render_plan(&plan(&store, &["title:ShortText"]));
        assert!(rendered.contains("(failed: 'title' already exists"));
        assert!(!rendered.contains("@@"));

        let store = MemoryStore::with_files([("blog/models.py", existing)]);
        let rendered = render_plan(&plan(&store, &["title:LongText"]));
        assert_eq!(rendered, "definition blog/models.py (unchanged)\n");
    }
}
