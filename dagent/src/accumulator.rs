//! Reassembly of streamed tool-call fragments.
//!
//! Fragments are keyed by their positional index. Ids and names overwrite when
//! a fragment carries a non-empty value; argument text is concatenated.
//!
//! ```rust
//! use dagent::ToolCallAccumulator;
//! use dprovider::ToolCallDelta;
//!
//! let mut accumulator = ToolCallAccumulator::new();
//! accumulator.push(ToolCallDelta::new(0).with_name("get_slide").with_arguments("{\"slide_"));
//! accumulator.push(ToolCallDelta::new(0).with_arguments("index\": 1}"));
//!
//! let calls = accumulator.finish();
//! assert_eq!(calls[0].id, "call_0");
//! assert_eq!(calls[0].arguments, "{\"slide_index\": 1}");
//! ```

use std::collections::BTreeMap;

use dprovider::{ToolCall, ToolCallDelta};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PartialToolCall {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCallAccumulator {
    calls: BTreeMap<u32, PartialToolCall>,
}

impl ToolCallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, delta: ToolCallDelta) {
        let call = self.calls.entry(delta.index).or_default();

        if let Some(id) = delta.id.filter(|id| !id.is_empty()) {
            call.id = Some(id);
        }
        if let Some(name) = delta.name.filter(|name| !name.is_empty()) {
            call.name = Some(name);
        }
        if let Some(arguments) = delta.arguments {
            call.arguments.push_str(&arguments);
        }
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Completed calls in index order. Calls that never received an id get
    /// `call_{index}`.
    pub fn finish(self) -> Vec<ToolCall> {
        self.calls
            .into_iter()
            .map(|(index, call)| ToolCall {
                id: call.id.unwrap_or_else(|| format!("call_{index}")),
                name: call.name.unwrap_or_default(),
                arguments: call.arguments,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use dprovider::ToolCallDelta;

    use super::ToolCallAccumulator;

    const ARGUMENTS: &str = r#"{"html": "<h1>Ünïcode tides</h1>", "position": -1, "layout": "title"}"#;

    fn split_into(arguments: &str, pieces: usize) -> Vec<String> {
        let chars = arguments.chars().collect::<Vec<_>>();
        let size = chars.len().div_ceil(pieces).max(1);
        chars
            .chunks(size)
            .map(|chunk| chunk.iter().collect())
            .collect()
    }

    #[test]
    fn any_fragmentation_reassembles_the_same_call() {
        let mut whole = ToolCallAccumulator::new();
        whole.push(
            ToolCallDelta::new(0)
                .with_id("call_abc")
                .with_name("add_slide")
                .with_arguments(ARGUMENTS),
        );
        let expected = whole.finish();

        for pieces in [2, 3, 7, ARGUMENTS.chars().count()] {
            let mut accumulator = ToolCallAccumulator::new();
            accumulator.push(ToolCallDelta::new(0).with_id("call_abc").with_name("add_slide"));
            for piece in split_into(ARGUMENTS, pieces) {
                accumulator.push(ToolCallDelta::new(0).with_arguments(piece));
            }
            assert_eq!(accumulator.finish(), expected, "split into {pieces} pieces");
        }
    }

    #[test]
    fn interleaved_calls_come_out_in_index_order() {
        let mut accumulator = ToolCallAccumulator::new();
        accumulator.push(ToolCallDelta::new(1).with_id("b").with_name("delete_slide"));
        accumulator.push(ToolCallDelta::new(0).with_id("a").with_name("add_slide"));
        accumulator.push(ToolCallDelta::new(1).with_arguments("{\"slide_index\":"));
        accumulator.push(ToolCallDelta::new(0).with_arguments("{}"));
        accumulator.push(ToolCallDelta::new(1).with_arguments(" 0}"));
        assert_eq!(accumulator.len(), 2);

        let calls = accumulator.finish();
        assert_eq!(calls[0].id, "a");
        assert_eq!(calls[1].name, "delete_slide");
        assert_eq!(calls[1].arguments, "{\"slide_index\": 0}");
    }

    #[test]
    fn empty_ids_do_not_overwrite_and_missing_ids_are_synthesized() {
        let mut accumulator = ToolCallAccumulator::new();
        accumulator.push(ToolCallDelta::new(0).with_id("first").with_name("list_slides"));
        accumulator.push(ToolCallDelta::new(0).with_id("").with_name(""));
        accumulator.push(ToolCallDelta::new(3).with_name("commit_edits"));

        let calls = accumulator.finish();
        assert_eq!(calls[0].id, "first");
        assert_eq!(calls[0].name, "list_slides");
        assert_eq!(calls[1].id, "call_3");
        assert_eq!(calls[1].arguments, "");
    }
}
