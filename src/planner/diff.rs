//! Diff engine for comparing desired vs observed inputs.
//!
//! Inputs are correlated by title. An observed input is considered equal to
//! its desired definition when `type` and `global` match and every populated
//! configuration field matches the observed attributes. Attributes that the
//! desired side does not populate are never compared.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::InputSpec;
use crate::graylog::ObservedInput;

use super::compare::values_equal;

/// Engine for computing diffs between desired and observed inputs.
///
/// Stateless: every function is pure given its input lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiffEngine;

/// Difference for a single input.
#[derive(Debug, Clone)]
pub struct ResourceDiff {
    /// Input title.
    pub title: String,
    /// Type of difference.
    pub diff_type: DiffType,
    /// Identifier of the matched observed input, if any.
    pub observed_id: Option<String>,
    /// Desired definition, absent for deletions.
    pub desired: Option<InputSpec>,
    /// Fields that differ.
    pub details: Vec<DiffDetail>,
}

/// Type of difference detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffType {
    /// Input needs to be created.
    Create,
    /// Input needs to be updated.
    Update,
    /// Input needs to be deleted.
    Delete,
    /// Input is unchanged.
    NoChange,
}

/// Detail about a specific difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffDetail {
    /// Field that differs.
    pub field: String,
    /// Observed value.
    pub old_value: Option<String>,
    /// Desired value.
    pub new_value: Option<String>,
}

/// Complete diff result.
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    /// All decisions: desired-list order, then deletions in observed order.
    pub diffs: Vec<ResourceDiff>,
    /// Number of inputs to create.
    pub creates: usize,
    /// Number of inputs to update.
    pub updates: usize,
    /// Number of inputs to delete.
    pub deletes: usize,
    /// Number of unchanged inputs.
    pub unchanged: usize,
    /// Ambiguities found while matching titles.
    pub warnings: Vec<String>,
}

impl DiffEngine {
    /// Returns true if the observed input does not satisfy the desired one.
    ///
    /// Only populated desired fields are compared. Attributes the server
    /// holds beyond those never count as a difference, so a field cannot be
    /// reset to its default by leaving it out of the document.
    #[must_use]
    pub fn is_different(desired: &InputSpec, observed: &ObservedInput) -> bool {
        if desired.input_type != observed.input_type || desired.global != observed.global {
            return true;
        }

        desired
            .configuration
            .populated_fields()
            .any(|(field, value)| !values_equal(field, value, &observed.attributes))
    }

    /// Lists every differing field, for display.
    #[must_use]
    pub fn compute_details(desired: &InputSpec, observed: &ObservedInput) -> Vec<DiffDetail> {
        let mut details = Vec::new();

        if desired.input_type != observed.input_type {
            details.push(DiffDetail {
                field: String::from("type"),
                old_value: Some(observed.input_type.clone()),
                new_value: Some(desired.input_type.clone()),
            });
        }

        if desired.global != observed.global {
            details.push(DiffDetail {
                field: String::from("global"),
                old_value: Some(observed.global.to_string()),
                new_value: Some(desired.global.to_string()),
            });
        }

        for (field, value) in desired.configuration.populated_fields() {
            if !values_equal(field, value, &observed.attributes) {
                details.push(DiffDetail {
                    field: field.to_string(),
                    old_value: observed
                        .attributes
                        .get_ignore_case(field)
                        .map(ToString::to_string),
                    new_value: Some(value.to_string()),
                });
            }
        }

        details
    }

    /// Computes the diff between the desired and observed input lists.
    #[must_use]
    pub fn compute_diff(desired: &[InputSpec], observed: &[ObservedInput]) -> DiffResult {
        let mut diffs = Vec::with_capacity(desired.len() + observed.len());
        let warnings = duplicate_warnings(desired, observed);

        for input in desired {
            diffs.push(Self::compute_input_diff(input, observed));
        }

        for obs in observed {
            if !desired.iter().any(|d| d.title == obs.title) {
                debug!("Input {} ({}) is not declared, deleting", obs.title, obs.id);
                diffs.push(ResourceDiff {
                    title: obs.title.clone(),
                    diff_type: DiffType::Delete,
                    observed_id: Some(obs.id.clone()),
                    desired: None,
                    details: vec![],
                });
            }
        }

        let count = |t: DiffType| diffs.iter().filter(|d| d.diff_type == t).count();
        let creates = count(DiffType::Create);
        let updates = count(DiffType::Update);
        let deletes = count(DiffType::Delete);
        let unchanged = count(DiffType::NoChange);

        DiffResult {
            diffs,
            creates,
            updates,
            deletes,
            unchanged,
            warnings,
        }
    }

    /// Computes the decision for a single desired input.
    fn compute_input_diff(input: &InputSpec, observed: &[ObservedInput]) -> ResourceDiff {
        let Some(obs) = observed.iter().find(|o| o.title == input.title) else {
            debug!("Input {} needs to be created", input.title);
            return ResourceDiff {
                title: input.title.clone(),
                diff_type: DiffType::Create,
                observed_id: None,
                desired: Some(input.clone()),
                details: vec![],
            };
        };

        if Self::is_different(input, obs) {
            debug!("Input {} ({}) needs update", input.title, obs.id);
            ResourceDiff {
                title: input.title.clone(),
                diff_type: DiffType::Update,
                observed_id: Some(obs.id.clone()),
                desired: Some(input.clone()),
                details: Self::compute_details(input, obs),
            }
        } else {
            debug!("Input {} is up to date", input.title);
            ResourceDiff {
                title: input.title.clone(),
                diff_type: DiffType::NoChange,
                observed_id: Some(obs.id.clone()),
                desired: Some(input.clone()),
                details: vec![],
            }
        }
    }
}

/// Reports titles that occur more than once on either side.
fn duplicate_warnings(desired: &[InputSpec], observed: &[ObservedInput]) -> Vec<String> {
    let mut warnings = Vec::new();

    for (title, count) in repeated(desired.iter().map(|d| d.title.as_str())) {
        let msg = format!(
            "Title '{title}' is declared {count} times; every declaration is matched against the same input"
        );
        warn!("{msg}");
        warnings.push(msg);
    }

    for (title, count) in repeated(observed.iter().map(|o| o.title.as_str())) {
        let first = observed
            .iter()
            .find(|o| o.title == title)
            .map_or("", |o| o.id.as_str());
        let msg = format!(
            "Server has {count} inputs titled '{title}'; only the first ({first}) is reconciled"
        );
        warn!("{msg}");
        warnings.push(msg);
    }

    warnings
}

/// Returns titles seen more than once, in order of first appearance.
fn repeated<'a>(titles: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut order = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for title in titles {
        let count = counts.entry(title).or_insert(0);
        if *count == 0 {
            order.push(title);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|t| counts.get(t).filter(|c| **c > 1).map(|c| (t, *c)))
        .collect()
}

impl DiffResult {
    /// Returns true if there are any changes.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.creates > 0 || self.updates > 0 || self.deletes > 0
    }

    /// Returns the total number of changes.
    #[must_use]
    pub const fn total_changes(&self) -> usize {
        self.creates + self.updates + self.deletes
    }

    /// Filters to only diffs that require action.
    #[must_use]
    pub fn actionable_diffs(&self) -> Vec<&ResourceDiff> {
        self.diffs
            .iter()
            .filter(|d| d.diff_type != DiffType::NoChange)
            .collect()
    }
}

impl std::fmt::Display for DiffType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::NoChange => "no change",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for ResourceDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.diff_type)?;
        if !self.details.is_empty() {
            write!(f, " (")?;
            for (i, detail) in self.details.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", detail.field)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputConfiguration;
    use crate::planner::AttributeMap;
    use serde_json::json;

    const SYSLOG_UDP: &str = "org.graylog2.inputs.syslog.udp.SyslogUDPInput";

    fn desired(title: &str, conf: InputConfiguration) -> InputSpec {
        InputSpec {
            title: title.to_string(),
            input_type: SYSLOG_UDP.to_string(),
            global: true,
            configuration: conf,
        }
    }

    fn observed(id: &str, title: &str, attrs: serde_json::Value) -> ObservedInput {
        ObservedInput {
            id: id.to_string(),
            title: title.to_string(),
            input_type: SYSLOG_UDP.to_string(),
            global: true,
            node: None,
            attributes: AttributeMap::try_from(attrs).unwrap(),
        }
    }

    fn bind_port(bind: &str, port: i64) -> InputConfiguration {
        InputConfiguration {
            bind_address: bind.to_string(),
            port,
            ..InputConfiguration::default()
        }
    }

    #[test]
    fn test_equal_inputs() {
        let cases = [
            (bind_port("0.0.0.0", 1514), json!({ "bind_address": "0.0.0.0", "port": 1514 })),
            (bind_port("127.0.0.1", 1514), json!({ "bind_address": "127.0.0.1", "port": 1514.0 })),
            (bind_port("", 1514), json!({ "bind_address": "10.0.0.1", "port": 1514 })),
        ];

        for (conf, attrs) in cases {
            let d = desired("syslog", conf);
            let o = observed("x1", "syslog", attrs);
            assert!(!DiffEngine::is_different(&d, &o), "expected equal: {o:?}");
        }
    }

    #[test]
    fn test_different_inputs() {
        let cases = [
            (bind_port("0.0.0.0", 1514), json!({ "bind_address": "10.0.0.1", "port": 1514 })),
            (bind_port("0.0.0.0", 1514), json!({ "bind_address": "0.0.0.0", "port": 4514 })),
            (bind_port("0.0.0.0", 1514), json!({ "bind_address": "0.0.0.0" })),
        ];

        for (conf, attrs) in cases {
            let d = desired("syslog", conf);
            let o = observed("x1", "syslog", attrs);
            assert!(DiffEngine::is_different(&d, &o), "expected different: {o:?}");
        }
    }

    #[test]
    fn test_type_and_global_short_circuit() {
        let d = desired("syslog", bind_port("0.0.0.0", 1514));
        let attrs = json!({ "bind_address": "0.0.0.0", "port": 1514 });

        let mut o = observed("x1", "syslog", attrs.clone());
        o.global = false;
        assert!(DiffEngine::is_different(&d, &o));

        let mut o = observed("x1", "syslog", attrs);
        o.input_type = String::from("org.graylog2.inputs.gelf.udp.GELFUDPInput");
        assert!(DiffEngine::is_different(&d, &o));
    }

    #[test]
    fn test_empty_configuration_matches_anything() {
        let d = desired("syslog", InputConfiguration::default());
        let o = observed("x1", "syslog", json!({ "port": 9999, "tls_enable": true }));
        assert!(!DiffEngine::is_different(&d, &o));
    }

    #[test]
    fn test_compute_details_lists_every_field() {
        let d = desired("syslog", bind_port("0.0.0.0", 4514));
        let mut o = observed("x1", "syslog", json!({ "bind_address": "10.0.0.1", "port": 1514 }));
        o.global = false;

        let details = DiffEngine::compute_details(&d, &o);
        let fields: Vec<&str> = details.iter().map(|x| x.field.as_str()).collect();
        assert_eq!(fields, ["global", "bind_address", "port"]);
        assert_eq!(details[2].old_value.as_deref(), Some("1514"));
        assert_eq!(details[2].new_value.as_deref(), Some("4514"));
    }

    #[test]
    fn test_compute_diff_counts_and_order() {
        let desired_inputs = vec![
            desired("a", bind_port("0.0.0.0", 1514)),
            desired("b", bind_port("0.0.0.0", 1515)),
            desired("c", bind_port("0.0.0.0", 1516)),
        ];
        let observed_inputs = vec![
            observed("x9", "z", json!({})),
            observed("x1", "a", json!({ "bind_address": "0.0.0.0", "port": 1514 })),
            observed("x2", "b", json!({ "bind_address": "0.0.0.0", "port": 9999 })),
        ];

        let diff = DiffEngine::compute_diff(&desired_inputs, &observed_inputs);
        let order: Vec<(&str, DiffType)> =
            diff.diffs.iter().map(|d| (d.title.as_str(), d.diff_type)).collect();

        assert_eq!(
            order,
            [
                ("a", DiffType::NoChange),
                ("b", DiffType::Update),
                ("c", DiffType::Create),
                ("z", DiffType::Delete),
            ]
        );
        assert_eq!((diff.creates, diff.updates, diff.deletes, diff.unchanged), (1, 1, 1, 1));
        assert!(diff.has_changes());
        assert_eq!(diff.total_changes(), 3);
        assert_eq!(diff.actionable_diffs().len(), 3);
        assert!(diff.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_titles_are_flagged() {
        let desired_inputs = vec![
            desired("a", bind_port("0.0.0.0", 1514)),
            desired("a", bind_port("0.0.0.0", 1515)),
        ];
        let observed_inputs = vec![
            observed("x1", "a", json!({ "bind_address": "0.0.0.0", "port": 1514 })),
            observed("x2", "a", json!({ "bind_address": "0.0.0.0", "port": 1515 })),
        ];

        let diff = DiffEngine::compute_diff(&desired_inputs, &observed_inputs);

        // Both declarations resolve to the first observed input.
        assert_eq!(diff.diffs.len(), 2);
        assert_eq!(diff.diffs[0].diff_type, DiffType::NoChange);
        assert_eq!(diff.diffs[1].diff_type, DiffType::Update);
        assert_eq!(diff.diffs[1].observed_id.as_deref(), Some("x1"));
        assert_eq!(diff.deletes, 0);
        assert_eq!(diff.warnings.len(), 2);
        assert!(diff.warnings[1].contains("(x1)"));
    }

    #[test]
    fn test_no_changes() {
        let diff = DiffEngine::compute_diff(&[], &[]);
        assert!(!diff.has_changes());
        assert!(diff.diffs.is_empty());
    }
}
