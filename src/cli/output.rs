//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::{ConfigHasher, StateConfig, ValidationResult};
use crate::graylog::ObservedInput;
use crate::planner::{Operation, SyncPlan};
use crate::reconciler::{DriftReport, ReconciliationResult};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Input row for the status table.
#[derive(Tabled)]
struct InputStatusRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Type")]
    input_type: String,
    #[tabled(rename = "Global")]
    global: String,
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "ID")]
    id: String,
}

/// Plan action row for table display.
#[derive(Tabled)]
struct PlanActionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Input")]
    input: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a sync plan for display.
    ///
    /// With `detailed`, every differing field of an update is listed.
    #[must_use]
    pub fn format_plan(&self, plan: &SyncPlan, detailed: bool) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&PlanJson::from(plan)).unwrap_or_default()
            }
            OutputFormat::Text => Self::format_plan_text(plan, detailed),
        }
    }

    /// Formats a plan as text.
    fn format_plan_text(plan: &SyncPlan, detailed: bool) -> String {
        let mut output = String::new();

        if plan.is_empty() {
            let _ = writeln!(
                output,
                "{} No changes required - inputs are up to date.",
                "✓".green()
            );
        } else {
            let _ = writeln!(output, "\nSync Plan");
            let _ = write!(
                output,
                "   Config hash: {}\n\n",
                ConfigHasher::short_hash(&plan.config_hash)
            );

            let rows: Vec<PlanActionRow> = plan
                .actions
                .iter()
                .enumerate()
                .map(|(i, a)| PlanActionRow {
                    index: i + 1,
                    action: Self::format_operation(&a.operation),
                    input: a.title.clone(),
                    reason: Self::truncate(&a.reason, 40),
                })
                .collect();

            output.push_str(&Table::new(rows).to_string());
            output.push('\n');

            if detailed {
                for action in plan.actions.iter().filter(|a| !a.details.is_empty()) {
                    let _ = write!(output, "\n   {}:\n", action.description());
                    for detail in &action.details {
                        let _ = writeln!(
                            output,
                            "     {}: {} -> {}",
                            detail.field,
                            detail.old_value.as_deref().unwrap_or("(missing)").red(),
                            detail.new_value.as_deref().unwrap_or("(none)").green()
                        );
                    }
                }
            }

            let _ = write!(
                output,
                "\nPlan: {} to create, {} to update, {} to delete, {} unchanged\n",
                plan.count("create").to_string().green(),
                plan.count("update").to_string().yellow(),
                plan.count("delete").to_string().red(),
                plan.unchanged
            );
        }

        if !plan.warnings.is_empty() {
            let _ = write!(output, "\n{} Warnings:\n", "⚠".yellow());
            for warning in &plan.warnings {
                let _ = writeln!(output, "   - {warning}");
            }
        }

        output
    }

    /// Formats the inputs currently on the server.
    #[must_use]
    pub fn format_inputs(&self, inputs: &[ObservedInput]) -> String {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<InputJson> = inputs.iter().map(InputJson::from).collect();
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => {
                if inputs.is_empty() {
                    return String::from("   No inputs on the server.\n");
                }

                let rows: Vec<InputStatusRow> = inputs
                    .iter()
                    .map(|i| InputStatusRow {
                        title: i.title.clone(),
                        input_type: Self::short_type(&i.input_type),
                        global: if i.global { "yes" } else { "no" }.to_string(),
                        port: i
                            .attributes
                            .get_ignore_case("port")
                            .map_or_else(|| String::from("-"), ToString::to_string),
                        id: i.id.clone(),
                    })
                    .collect();

                let mut output = Table::new(rows).to_string();
                let _ = write!(output, "\n\n{} inputs on the server.\n", inputs.len());
                output
            }
        }
    }

    /// Formats a validation outcome and a summary of the document.
    #[must_use]
    pub fn format_validation(
        &self,
        config: &StateConfig,
        result: &ValidationResult,
        show_warnings: bool,
    ) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "valid": result.is_valid(),
                "api_url": config.api.url,
                "inputs": config.inputs.len(),
                "config_hash": ConfigHasher::hash_inputs(&config.inputs),
                "warnings": result.warnings,
            }))
            .unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = format!("{} Configuration is valid.\n", "✓".green());

                if show_warnings && !result.warnings.is_empty() {
                    let _ = write!(output, "\n{} Warnings:\n", "⚠".yellow());
                    for warning in &result.warnings {
                        let _ = writeln!(output, "   - {warning}");
                    }
                } else if result.warning_count() > 0 {
                    let _ = writeln!(
                        output,
                        "   {} warnings (use --warnings to show)",
                        result.warning_count()
                    );
                }

                let _ = write!(output, "\nConfiguration summary:\n");
                let _ = writeln!(output, "   API: {}", config.api.url);
                let _ = writeln!(output, "   Inputs: {}", config.inputs.len());
                output
            }
        }
    }

    /// Formats a drift report.
    #[must_use]
    pub fn format_drift(&self, report: &DriftReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => {
                if report.is_converged() {
                    format!("{} No drift detected - state is converged.\n", "✓".green())
                } else {
                    let mut output = format!("{} Drift detected:\n\n", "⚠".yellow());
                    for resource in &report.drifted_resources {
                        let _ = writeln!(output, "   - {resource}");
                    }
                    let _ = write!(
                        output,
                        "\n{} pending changes ({} declared, {} on server).\n",
                        report.drifted_resources.len(),
                        report.total_resources,
                        report.observed_count
                    );
                    output
                }
            }
        }
    }

    /// Formats a reconciliation result.
    #[must_use]
    pub fn format_reconciliation(&self, result: &ReconciliationResult) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = format!("{} Reconciliation successful\n\n", "✓".green());
                let _ = writeln!(output, "   Created: {}", result.created);
                let _ = writeln!(output, "   Updated: {}", result.updated);
                let _ = writeln!(output, "   Deleted: {}", result.deleted);
                let _ = writeln!(output, "   Unchanged: {}", result.unchanged);

                if !result.created_ids.is_empty() {
                    let _ = writeln!(output, "   New IDs: {}", result.created_ids.join(", "));
                }

                if !result.warnings.is_empty() {
                    let _ = write!(output, "\n{} Warnings:\n", "⚠".yellow());
                    for warning in &result.warnings {
                        let _ = writeln!(output, "   - {warning}");
                    }
                }

                output
            }
        }
    }

    /// Formats an error message.
    #[must_use]
    pub fn error(&self, message: &str) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(
                &serde_json::json!({ "status": "error", "message": message }),
            )
            .unwrap_or_default(),
            OutputFormat::Text => format!("{} {message}", "✗".red()),
        }
    }

    /// Formats an operation kind with color.
    fn format_operation(operation: &Operation) -> String {
        match operation {
            Operation::Create(_) => "+create".green().to_string(),
            Operation::Update(..) => "~update".yellow().to_string(),
            Operation::Delete(_) => "-delete".red().to_string(),
        }
    }

    /// Strips the package prefix from a Graylog input class name.
    fn short_type(input_type: &str) -> String {
        input_type
            .rsplit('.')
            .next()
            .unwrap_or(input_type)
            .to_string()
    }

    /// Truncates a string to a maximum number of characters.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{head}...")
        }
    }
}

// JSON serialization helpers

#[derive(serde::Serialize)]
struct PlanJson {
    config_hash: String,
    created_at: String,
    action_count: usize,
    creates: usize,
    updates: usize,
    deletes: usize,
    unchanged: usize,
    actions: Vec<ActionJson>,
    warnings: Vec<String>,
}

#[derive(serde::Serialize)]
struct ActionJson {
    action: &'static str,
    title: String,
    id: Option<String>,
    reason: String,
    changed_fields: Vec<String>,
}

#[derive(serde::Serialize)]
struct InputJson {
    id: String,
    title: String,
    #[serde(rename = "type")]
    input_type: String,
    global: bool,
    node: Option<String>,
}

impl From<&SyncPlan> for PlanJson {
    fn from(plan: &SyncPlan) -> Self {
        Self {
            config_hash: plan.config_hash.clone(),
            created_at: plan.created_at.to_rfc3339(),
            action_count: plan.action_count(),
            creates: plan.count("create"),
            updates: plan.count("update"),
            deletes: plan.count("delete"),
            unchanged: plan.unchanged,
            actions: plan
                .actions
                .iter()
                .map(|a| ActionJson {
                    action: a.operation.kind(),
                    title: a.title.clone(),
                    id: a.operation.target_id().map(String::from),
                    reason: a.reason.clone(),
                    changed_fields: a.details.iter().map(|d| d.field.clone()).collect(),
                })
                .collect(),
            warnings: plan.warnings.clone(),
        }
    }
}

impl From<&ObservedInput> for InputJson {
    fn from(input: &ObservedInput) -> Self {
        Self {
            id: input.id.clone(),
            title: input.title.clone(),
            input_type: input.input_type.clone(),
            global: input.global,
            node: input.node.clone(),
        }
    }
}
