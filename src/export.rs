//! JSON-lines export: dump a net's persisted outcomes.
//!
//! One `OutcomeRecord` per line, preceded by a header line with the net's
//! status. The output can be diffed between builds or bulk-loaded into
//! another store.
//!
//! ```text
//! {"net":1,"status":"INDEXED","index_type":"PREDICATES","outcomes":3}
//! {"net":1,"task_a":1,"relation":"can_occur","value":true}
//! {"net":1,"task_a":1,"task_b":2,"relation":"can_cooccur","value":true}
//! ```

use std::io::Write;

use serde::Serialize;

use crate::Result;
use crate::model::{IndexStatus, IndexType, NetId};
use crate::storage::IndexStore;

#[derive(Debug, Serialize)]
struct ExportHeader {
    net: NetId,
    status: IndexStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_type: Option<IndexType>,
    outcomes: usize,
}

/// Write every stored outcome of `net` as JSON lines. Returns the number
/// of outcome lines written.
pub fn export_outcomes_jsonl<S: IndexStore + ?Sized>(
    store: &S,
    net: NetId,
    writer: &mut dyn Write,
) -> Result<usize> {
    let records = store.outcomes(net)?;

    let header = ExportHeader {
        net,
        status: store.get_status(net)?,
        index_type: store.get_index_type(net)?,
        outcomes: records.len(),
    };
    serde_json::to_writer(&mut *writer, &header)?;
    writeln!(writer)?;

    for record in &records {
        serde_json::to_writer(&mut *writer, record)?;
        writeln!(writer)?;
    }
    writer.flush()?;

    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::Relation;
    use crate::model::TaskId;
    use crate::storage::{MemoryIndexStore, OutcomeRecord};

    #[test]
    fn test_export_lines() {
        let store = MemoryIndexStore::new();
        let net = NetId(1);
        store.register_net(net, IndexType::Predicates).unwrap();
        store.write_unary_outcome(net, TaskId(1), Relation::CanOccur, true).unwrap();
        store.write_binary_outcome(net, TaskId(1), TaskId(2), Relation::CanCooccur, false).unwrap();

        let mut buf = Vec::new();
        let n = export_outcomes_jsonl(&store, net, &mut buf).unwrap();
        assert_eq!(n, 2);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            r#"{"net":1,"status":"UNINDEXED","index_type":"PREDICATES","outcomes":2}"#
        );
        assert_eq!(lines[1], r#"{"net":1,"task_a":1,"relation":"can_occur","value":true}"#);

        let back: OutcomeRecord = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(back.task_b, Some(TaskId(2)));
        assert_eq!(back.relation, Relation::CanCooccur);
    }

    #[test]
    fn test_export_unknown_net() {
        let store = MemoryIndexStore::new();
        let mut buf = Vec::new();
        assert_eq!(export_outcomes_jsonl(&store, NetId(9), &mut buf).unwrap(), 0);
        assert_eq!(
            String::from_utf8(buf).unwrap().trim(),
            r#"{"net":9,"status":"UNINDEXED","outcomes":0}"#
        );
    }
}
