//! Method definitions and identity resolution

use core_types::{Bci, MethodId, VmError, VmResult};
use parking_lot::RwLock;
use std::sync::Arc;

/// Description of a method before it is registered.
///
/// Block starts are the bytecode offsets that begin a basic block; only
/// those are valid on-stack-replacement entries. Offset 0 is always one.
#[derive(Debug, Clone)]
pub struct MethodDef {
    holder: String,
    name: String,
    signature: String,
    code_length: Bci,
    block_starts: Vec<Bci>,
    inlinees: Vec<MethodId>,
    compilable: bool,
}

impl MethodDef {
    /// Create a definition for `holder.name` with an empty signature
    pub fn new(holder: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            holder: holder.into(),
            name: name.into(),
            signature: "()V".to_string(),
            code_length: 16,
            block_starts: vec![0],
            inlinees: Vec::new(),
            compilable: true,
        }
    }

    /// Set the method descriptor
    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }

    /// Set the bytecode length
    pub fn code_length(mut self, length: Bci) -> Self {
        self.code_length = length;
        self
    }

    /// Add basic-block entry offsets
    pub fn block_starts(mut self, starts: impl IntoIterator<Item = Bci>) -> Self {
        self.block_starts.extend(starts);
        self
    }

    /// Record a callee the compiler inlines into this method
    pub fn inlines(mut self, callee: MethodId) -> Self {
        self.inlinees.push(callee);
        self
    }

    /// Exclude the method from compilation
    pub fn not_compilable(mut self) -> Self {
        self.compilable = false;
        self
    }
}

/// A registered method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    /// Method identity
    pub id: MethodId,
    /// Declaring class
    pub holder: String,
    /// Simple name
    pub name: String,
    /// Descriptor
    pub signature: String,
    /// Bytecode length
    pub code_length: Bci,
    /// Sorted basic-block entry offsets
    pub block_starts: Vec<Bci>,
    /// Callees inlined by the compiler
    pub inlinees: Vec<MethodId>,
    /// Whether the compiler accepts this method
    pub compilable: bool,
}

impl MethodInfo {
    /// Fully qualified name used in logs and traces
    pub fn external_name(&self) -> String {
        format!("{}.{}{}", self.holder, self.name, self.signature)
    }

    /// Whether `bci` begins a basic block
    pub fn is_block_start(&self, bci: Bci) -> bool {
        self.block_starts.binary_search(&bci).is_ok()
    }

    /// Whether compiled code of this method inlines `callee`
    pub fn inlines(&self, callee: MethodId) -> bool {
        self.inlinees.contains(&callee)
    }
}

/// Registry of all methods known to the VM
///
/// Methods are never unloaded, so ids stay valid for the life of the table.
#[derive(Debug, Default)]
pub struct MethodTable {
    methods: RwLock<Vec<Arc<MethodInfo>>>,
}

impl MethodTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method and return its id
    pub fn define(&self, def: MethodDef) -> MethodId {
        let mut methods = self.methods.write();
        let id = MethodId(methods.len() as u32);

        let mut block_starts = def.block_starts;
        block_starts.sort_unstable();
        block_starts.dedup();
        let code_length = block_starts
            .last()
            .map_or(def.code_length, |last| def.code_length.max(last + 1));

        methods.push(Arc::new(MethodInfo {
            id,
            holder: def.holder,
            name: def.name,
            signature: def.signature,
            code_length,
            block_starts,
            inlinees: def.inlinees,
            compilable: def.compilable,
        }));
        id
    }

    /// Look up a method by id
    pub fn get(&self, id: MethodId) -> Option<Arc<MethodInfo>> {
        self.methods.read().get(id.0 as usize).cloned()
    }

    /// Look up a method by id, failing with `UnknownMethod`
    pub fn require(&self, id: MethodId) -> VmResult<Arc<MethodInfo>> {
        self.get(id)
            .ok_or_else(|| VmError::unknown_method(format!("{} is not registered", id)))
    }

    /// Resolve a declared method by holder and name
    pub fn resolve(&self, holder: &str, name: &str) -> VmResult<MethodId> {
        self.methods
            .read()
            .iter()
            .find(|m| m.holder == holder && m.name == name)
            .map(|m| m.id)
            .ok_or_else(|| VmError::unknown_method(format!("no method {}.{}", holder, name)))
    }

    /// Number of registered methods
    pub fn len(&self) -> usize {
        self.methods.read().len()
    }

    /// Whether no method is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
