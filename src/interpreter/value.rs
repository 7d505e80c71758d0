/// Index of a string in the interpreter heap. References are only ever
/// produced by `Heap::allocate`, so a live `HeapRef` always resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapRef(usize);

/// A single execution-stack slot: either an integer or a reference into the
/// string heap. Every operation dispatches on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(HeapRef),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Str(_) => "string",
        }
    }
}

/// Append-only string storage. Every string a program produces is pushed
/// here exactly once and addressed by `HeapRef`; nothing is freed or reused
/// for the lifetime of the interpreter.
#[derive(Debug, Default)]
pub struct Heap {
    strings: Vec<String>,
}

impl Heap {
    pub(super) fn allocate(&mut self, string: String) -> HeapRef {
        self.strings.push(string);
        HeapRef(self.strings.len() - 1)
    }

    pub(super) fn resolve(&self, reference: HeapRef) -> &str {
        &self.strings[reference.0]
    }

    pub(super) fn strings(&self) -> &[String] {
        &self.strings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_keep_insertion_order() {
        let mut heap = Heap::default();
        let first = heap.allocate("ab".to_string());
        let second = heap.allocate("cd".to_string());
        assert_eq!(heap.resolve(first), "ab");
        assert_eq!(heap.resolve(second), "cd");
        assert_eq!(heap.strings(), ["ab", "cd"]);
    }

    #[test]
    fn equal_content_gets_distinct_references() {
        let mut heap = Heap::default();
        let first = heap.allocate("dup".to_string());
        let second = heap.allocate("dup".to_string());
        assert_ne!(first, second);
        assert_eq!(heap.resolve(first), heap.resolve(second));
    }
}
