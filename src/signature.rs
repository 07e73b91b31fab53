//! Purpose: Resolve a callable's normalized parameter signature.
//! Exports: `Signature`.
//! Role: Signature Resolver feeding the binder; one per bind.
//! Invariants: A method's receiver (parameter 0) never counts toward arity.
//! Invariants: Variadic signatures resolve; rejection happens at bind time.

use crate::core::error::{Error, ErrorKind};
use crate::core::types::{FuncType, MethodType, ParamType, TypeDesc};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature {
    func: FuncType,
    offset: usize,
    context_index: Option<usize>,
}

impl Signature {
    /// Fails with `NotCallable` unless `ty` is a function descriptor.
    pub fn of_function(ty: &TypeDesc) -> Result<Self, Error> {
        match ty {
            TypeDesc::Func(func) => Ok(Self::of_func_type(func)),
            _ => Err(Error::new(ErrorKind::NotCallable)),
        }
    }

    pub fn of_func_type(func: &FuncType) -> Self {
        Self::resolve(func.clone(), 0)
    }

    pub fn of_method(method: &MethodType) -> Self {
        Self::resolve(method.func().clone(), 1)
    }

    fn resolve(func: FuncType, offset: usize) -> Self {
        let context_index = func
            .param(offset)
            .filter(|param| param.ty().is_context())
            .map(|_| offset);
        Self {
            func,
            offset,
            context_index,
        }
    }

    pub fn func(&self) -> &FuncType {
        &self.func
    }

    /// Every declared parameter, receiver included.
    pub fn params(&self) -> &[ParamType] {
        self.func.params()
    }

    /// Position where caller-visible parameters begin (1 for methods).
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_method(&self) -> bool {
        self.offset == 1
    }

    /// Operand count before context removal.
    pub fn num_in(&self) -> usize {
        self.func.num_in() - self.offset
    }

    /// Number of JSON elements a caller must supply.
    pub fn arity(&self) -> usize {
        self.num_in() - usize::from(self.context_index.is_some())
    }

    pub fn context_index(&self) -> Option<usize> {
        self.context_index
    }

    pub fn has_context(&self) -> bool {
        self.context_index.is_some()
    }

    pub fn is_variadic(&self) -> bool {
        self.func.is_variadic()
    }

    pub fn results(&self) -> &[TypeDesc] {
        self.func.results()
    }
}
