//! End-to-end reconciliation properties against an in-memory remote.

use std::sync::Mutex;

use async_trait::async_trait;
use graylog_state::config::{InputConfiguration, InputSpec};
use graylog_state::error::{ApiError, Result};
use graylog_state::graylog::ObservedInput;
use graylog_state::planner::{AttributeMap, Operation, reconcile};
use graylog_state::reconciler::Reconciler;
use graylog_state::remote::RemoteState;

/// Remote that stores inputs the way Graylog reports them: configuration
/// becomes untyped attributes with every number as a float.
#[derive(Default)]
struct InMemoryRemote {
    inputs: Mutex<Vec<ObservedInput>>,
    next_id: Mutex<u32>,
}

impl InMemoryRemote {
    fn to_observed(id: String, input: &InputSpec) -> ObservedInput {
        let attrs = serde_json::to_value(&input.configuration).unwrap_or_default();
        ObservedInput {
            id,
            title: input.title.clone(),
            input_type: input.input_type.clone(),
            global: input.global,
            node: None,
            attributes: AttributeMap::try_from(attrs).unwrap_or_default(),
        }
    }

    fn snapshot(&self) -> Vec<ObservedInput> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteState for InMemoryRemote {
    async fn fetch_all(&self) -> Result<Vec<ObservedInput>> {
        Ok(self.snapshot())
    }

    async fn create(&self, input: &InputSpec) -> Result<String> {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let id = format!("id-{next}");
        self.inputs
            .lock()
            .unwrap()
            .push(Self::to_observed(id.clone(), input));
        Ok(id)
    }

    async fn update(&self, id: &str, input: &InputSpec) -> Result<()> {
        let mut inputs = self.inputs.lock().unwrap();
        let slot = inputs
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| ApiError::InputNotFound {
                input_id: id.to_string(),
            })?;
        *slot = Self::to_observed(id.to_string(), input);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut inputs = self.inputs.lock().unwrap();
        let before = inputs.len();
        inputs.retain(|i| i.id != id);
        if inputs.len() == before {
            return Err(ApiError::InputNotFound {
                input_id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

fn input(title: &str, bind: &str, port: i64) -> InputSpec {
    InputSpec {
        title: title.to_string(),
        input_type: String::from("org.graylog2.inputs.syslog.tcp.SyslogTCPInput"),
        global: true,
        configuration: InputConfiguration {
            bind_address: bind.to_string(),
            port,
            tcp_keepalive: true,
            ..InputConfiguration::default()
        },
    }
}

#[tokio::test]
async fn test_second_pass_is_a_no_op() {
    let remote = InMemoryRemote::default();
    let desired = vec![
        input("syslog-tcp", "0.0.0.0", 1514),
        input("syslog-tcp-internal", "127.0.0.1", 1515),
    ];

    let first = Reconciler::new(&desired, &remote).reconcile().await.unwrap();
    assert_eq!(first.created, 2);

    let observed = remote.snapshot();
    assert!(reconcile(&desired, &observed).is_empty());

    let second = Reconciler::new(&desired, &remote).reconcile().await.unwrap();
    assert_eq!(second.total_changes(), 0);
    assert_eq!(second.unchanged, 2);
}

#[tokio::test]
async fn test_create_update_create_remove_sequence() {
    let remote = InMemoryRemote::default();

    // Create one.
    let desired = vec![input("syslog", "0.0.0.0", 1514)];
    Reconciler::new(&desired, &remote).reconcile().await.unwrap();
    assert_eq!(remote.snapshot().len(), 1);

    // Update it in place.
    let desired = vec![input("syslog", "0.0.0.0", 4514)];
    let result = Reconciler::new(&desired, &remote).reconcile().await.unwrap();
    assert_eq!((result.created, result.updated), (0, 1));
    let observed = remote.snapshot();
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0].id, "id-1");

    // Add a second one.
    let desired = vec![
        input("syslog", "0.0.0.0", 4514),
        input("syslog-2", "0.0.0.0", 1515),
    ];
    Reconciler::new(&desired, &remote).reconcile().await.unwrap();
    assert_eq!(remote.snapshot().len(), 2);

    // Remove everything.
    let result = Reconciler::new(&[], &remote).reconcile().await.unwrap();
    assert_eq!(result.deleted, 2);
    assert!(remote.snapshot().is_empty());
}

#[tokio::test]
async fn test_create_delete_symmetry() {
    let remote = InMemoryRemote::default();
    let desired = vec![input("a", "0.0.0.0", 1), input("b", "0.0.0.0", 2)];
    Reconciler::new(&desired, &remote).reconcile().await.unwrap();

    let observed = remote.snapshot();
    let ops = reconcile(&[], &observed);
    let deleted: Vec<&str> = ops
        .iter()
        .filter_map(|op| match op {
            Operation::Delete(id) => Some(id.as_str()),
            _ => None,
        })
        .collect();
    let created: Vec<&str> = observed.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(deleted, created);
}

#[tokio::test]
async fn test_server_added_attributes_do_not_cause_updates() {
    let remote = InMemoryRemote::default();
    let desired = vec![input("a", "0.0.0.0", 1514)];
    Reconciler::new(&desired, &remote).reconcile().await.unwrap();

    // Graylog fills in defaults the document never mentions.
    {
        let mut inputs = remote.inputs.lock().unwrap();
        let mut attrs: Vec<(String, graylog_state::planner::AttrValue)> = inputs[0]
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        attrs.push((
            String::from("recv_buffer_size"),
            graylog_state::planner::AttrValue::Number(1_048_576.0),
        ));
        attrs.push((String::from("tls_enable"), graylog_state::planner::AttrValue::Bool(false)));
        inputs[0].attributes = attrs.into_iter().collect();
    }

    let drift = Reconciler::new(&desired, &remote).check_drift().await.unwrap();
    assert!(drift.is_converged());
}
