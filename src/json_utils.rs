use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Type of a JSON node found by the structure scanner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NodeType {
    Object,
    Array,
}

/// Coordinates of a JSON structure within a larger text, including nested children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjCoords {
    pub start: usize,
    pub end: usize, // inclusive index of the closing bracket/brace
    pub kind: NodeType,
    pub children: Vec<ObjCoords>,
}

impl ObjCoords {
    pub fn new(start: usize, end: usize, kind: NodeType, children: Vec<ObjCoords>) -> Self {
        Self { start, end, kind, children }
    }

    /// Slice of `text` covered by this node.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..=self.end]
    }
}

#[derive(Debug)]
struct Frame {
    start: usize,
    kind: NodeType,
    children: Vec<ObjCoords>,
}

/// Find all balanced JSON object/array structures in the given text. Coordinates are byte indices.
///
/// Brackets inside string literals are ignored. A closing bracket that does
/// not match the innermost open one discards that frame.
#[instrument(target = "quizsmith::json", skip(text), fields(text_len = text.len()))]
pub fn find_json_structures(text: &str) -> Vec<ObjCoords> {
    let bytes = text.as_bytes();
    let mut results: Vec<ObjCoords> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    let mut in_string = false;
    let mut escape = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escape {
                escape = false;
                continue;
            }
            match b {
                b'\\' => escape = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        let closing = match b {
            b'"' => {
                in_string = true;
                None
            }
            b'{' => {
                stack.push(Frame { start: i, kind: NodeType::Object, children: Vec::new() });
                None
            }
            b'[' => {
                stack.push(Frame { start: i, kind: NodeType::Array, children: Vec::new() });
                None
            }
            b'}' => Some(NodeType::Object),
            b']' => Some(NodeType::Array),
            _ => None,
        };

        if let Some(kind) = closing {
            if let Some(frame) = stack.pop() {
                if frame.kind == kind {
                    let node = ObjCoords::new(frame.start, i, kind, frame.children);
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(node);
                    } else {
                        results.push(node);
                    }
                }
            }
        }
    }

    debug!(target: "quizsmith::json", count = results.len(), "found root structures");
    results
}

/// Outcome of looking for exactly one array of `T` in free text.
#[derive(Debug)]
pub enum ArrayExtraction<T> {
    /// Exactly one candidate array deserialized as `Vec<T>`.
    Found(Vec<T>),
    /// The text contains no candidate array at all.
    NoArray,
    /// Candidate arrays exist but none deserialized; carries the first error.
    Malformed(serde_json::Error),
    /// More than one candidate array deserialized.
    Ambiguous(usize),
}

/// Locate the single JSON array in `text` that deserializes as `Vec<T>`.
///
/// Root-level arrays are tried first. If none of them fits, arrays held
/// directly by a root-level object (`{"questions": [...]}`) are tried.
/// Trailing prose with brackets cannot corrupt the payload, and when two
/// arrays at the same level both fit the caller gets `Ambiguous`.
#[instrument(target = "quizsmith::json", skip(text), fields(text_len = text.len()))]
pub fn extract_single_array<T: DeserializeOwned>(text: &str) -> ArrayExtraction<T> {
    let roots = find_json_structures(text);
    let root_arrays: Vec<&ObjCoords> = roots.iter().filter(|node| node.kind == NodeType::Array).collect();
    let wrapped_arrays: Vec<&ObjCoords> = roots
        .iter()
        .filter(|node| node.kind == NodeType::Object)
        .flat_map(|node| node.children.iter())
        .filter(|child| child.kind == NodeType::Array)
        .collect();

    if root_arrays.is_empty() && wrapped_arrays.is_empty() {
        return ArrayExtraction::NoArray;
    }

    let mut first_error = None;
    for candidates in [root_arrays, wrapped_arrays] {
        let mut found = deserialize_candidates::<T>(text, &candidates, &mut first_error);
        match found.len() {
            0 => continue,
            1 => return ArrayExtraction::Found(found.remove(0)),
            n => return ArrayExtraction::Ambiguous(n),
        }
    }

    match first_error {
        Some(e) => ArrayExtraction::Malformed(e),
        None => ArrayExtraction::NoArray,
    }
}

fn deserialize_candidates<T: DeserializeOwned>(
    text: &str,
    candidates: &[&ObjCoords],
    first_error: &mut Option<serde_json::Error>,
) -> Vec<Vec<T>> {
    let mut found = Vec::new();
    for node in candidates {
        match serde_json::from_str::<Vec<T>>(node.slice(text)) {
            Ok(items) => found.push(items),
            Err(e) => {
                debug!(target: "quizsmith::json", start = node.start, end = node.end, error = %e, "array candidate rejected");
                first_error.get_or_insert(e);
            }
        }
    }
    found
}
