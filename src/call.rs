//! Purpose: Invoke typed callables with bound arguments and classify their outputs.
//! Exports: `Handler`, `MethodHandler`, `Callable`, `dispatch`, and the `call_*` helpers.
//! Role: Call Dispatcher; the only place where erased arguments become typed again.
//! Invariants: A non-nil error output discards every other output.
//! Invariants: Nil error slots stay in the `ResultSet` in declared order.
//! Invariants: No coercion happens here; mismatched argument lists are `Internal` errors.

use crate::bind::{self, BindOptions};
use crate::core::error::{Error, ErrorKind};
use crate::core::reflect::{JsonType, Returns};
use crate::core::types::{FuncType, MethodType, ParamType, TypeDesc};
use crate::core::value::{AnyValue, Arguments, Output, ResultSet};
use crate::signature::Signature;
use std::sync::Arc;

/// A free function callable with JSON-bound arguments.
pub trait Handler<Args>: Send + Sync + 'static {
    fn func_type() -> FuncType;

    fn invoke(&self, args: Arguments) -> Result<Vec<Output>, Error>;
}

/// A method on `Recv` callable with JSON-bound arguments.
pub trait MethodHandler<Recv, Args>: Send + Sync + 'static {
    fn method_type() -> MethodType;

    fn invoke(&self, receiver: &Recv, args: Arguments) -> Result<Vec<Output>, Error>;
}

struct ArgReader {
    values: std::vec::IntoIter<AnyValue>,
    index: usize,
}

impl ArgReader {
    fn new(args: Arguments) -> Self {
        Self {
            values: args.into_iter(),
            index: 0,
        }
    }

    fn take<T: JsonType>(&mut self) -> Result<T, Error> {
        let index = self.index;
        self.index += 1;
        let value = self.values.next().ok_or_else(|| {
            Error::new(ErrorKind::Internal)
                .with_message(format!("missing argument {index}"))
                .with_argument(index)
        })?;
        value.downcast::<T>().map_err(|value| {
            Error::new(ErrorKind::Internal)
                .with_message(format!(
                    "argument {index} is {:?}, expected {:?}",
                    value.ty(),
                    T::descriptor()
                ))
                .with_argument(index)
        })
    }

    fn finish(mut self) -> Result<(), Error> {
        match self.values.next() {
            None => Ok(()),
            Some(_) => Err(Error::new(ErrorKind::Internal)
                .with_message(format!("unexpected argument {}", self.index))
                .with_argument(self.index)),
        }
    }
}

macro_rules! impl_handler {
    ($($ty:ident),*) => {
        impl<F, R, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            R: Returns,
            $($ty: JsonType,)*
        {
            fn func_type() -> FuncType {
                FuncType::new(vec![$(ParamType::of::<$ty>()),*], R::descriptors())
            }

            #[allow(non_snake_case, unused_mut)]
            fn invoke(&self, args: Arguments) -> Result<Vec<Output>, Error> {
                let mut reader = ArgReader::new(args);
                $(let $ty = reader.take::<$ty>()?;)*
                reader.finish()?;
                Ok(self($($ty),*).into_outputs())
            }
        }

        impl<F, Recv, R, $($ty,)*> MethodHandler<Recv, ($($ty,)*)> for F
        where
            F: Fn(&Recv, $($ty),*) -> R + Send + Sync + 'static,
            Recv: 'static,
            R: Returns,
            $($ty: JsonType,)*
        {
            fn method_type() -> MethodType {
                MethodType::new::<Recv>(vec![$(ParamType::of::<$ty>()),*], R::descriptors())
            }

            #[allow(non_snake_case, unused_mut)]
            fn invoke(&self, receiver: &Recv, args: Arguments) -> Result<Vec<Output>, Error> {
                let mut reader = ArgReader::new(args);
                $(let $ty = reader.take::<$ty>()?;)*
                reader.finish()?;
                Ok(self(receiver, $($ty),*).into_outputs())
            }
        }
    };
}

impl_handler!();
impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);
impl_handler!(A1, A2, A3, A4, A5);
impl_handler!(A1, A2, A3, A4, A5, A6);
impl_handler!(A1, A2, A3, A4, A5, A6, A7);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Partitions raw outputs into a `ResultSet` or the first non-nil error.
pub fn dispatch(outputs: Vec<Output>) -> Result<ResultSet, Error> {
    let mut values = Vec::with_capacity(outputs.len());
    for output in outputs {
        match output {
            Output::Value(value) => values.push(value),
            Output::Error(None) => values.push(AnyValue::nil_error()),
            Output::Error(Some(err)) => {
                tracing::debug!(error = %err, "callable returned an error");
                return Err(err);
            }
        }
    }
    Ok(ResultSet::from_values(values))
}

type Invoke = Box<dyn Fn(Arguments) -> Result<Vec<Output>, Error> + Send + Sync>;

enum Target {
    Function(FuncType),
    Method(MethodType),
}

/// A free function or a method bound to its receiver, behind one interface.
pub struct Callable {
    target: Target,
    invoke: Invoke,
}

impl Callable {
    pub fn function<F, Args>(f: F) -> Self
    where
        F: Handler<Args>,
        Args: 'static,
    {
        Self {
            target: Target::Function(F::func_type()),
            invoke: Box::new(move |args| f.invoke(args)),
        }
    }

    pub fn method<Recv, F, Args>(receiver: Arc<Recv>, method: F) -> Self
    where
        Recv: Send + Sync + 'static,
        F: MethodHandler<Recv, Args>,
        Args: 'static,
    {
        Self {
            target: Target::Method(F::method_type()),
            invoke: Box::new(move |args| method.invoke(receiver.as_ref(), args)),
        }
    }

    pub fn ty(&self) -> TypeDesc {
        let func = match &self.target {
            Target::Function(func) => func.clone(),
            Target::Method(method) => method.func().clone(),
        };
        TypeDesc::Func(Box::new(func))
    }

    pub fn is_method(&self) -> bool {
        matches!(self.target, Target::Method(_))
    }

    pub fn signature(&self) -> Signature {
        match &self.target {
            Target::Function(func) => Signature::of_func_type(func),
            Target::Method(method) => Signature::of_method(method),
        }
    }

    pub fn bind(&self, args: &str, options: &BindOptions) -> Result<Arguments, Error> {
        bind::bind(&self.signature(), args, options)
    }

    /// Invokes with an already bound argument list; the receiver is supplied automatically.
    pub fn call(&self, args: Arguments) -> Result<ResultSet, Error> {
        dispatch((self.invoke)(args)?)
    }

    pub fn call_json(&self, args: &str, options: &BindOptions) -> Result<ResultSet, Error> {
        let arguments = self.bind(args, options)?;
        self.call(arguments)
    }
}

impl std::fmt::Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callable")
            .field("method", &self.is_method())
            .field("ty", &self.ty())
            .finish()
    }
}

pub fn type_of_fn<F, Args>(_f: &F) -> TypeDesc
where
    F: Handler<Args>,
{
    TypeDesc::Func(Box::new(F::func_type()))
}

pub fn type_of_method<Recv, F, Args>(_method: &F) -> MethodType
where
    F: MethodHandler<Recv, Args>,
{
    F::method_type()
}

pub fn call_func<F, Args>(f: &F, args: &str, options: &BindOptions) -> Result<ResultSet, Error>
where
    F: Handler<Args>,
{
    let signature = Signature::of_func_type(&F::func_type());
    let arguments = bind::bind(&signature, args, options)?;
    call_func_args(f, arguments)
}

pub fn call_func_args<F, Args>(f: &F, args: Arguments) -> Result<ResultSet, Error>
where
    F: Handler<Args>,
{
    dispatch(f.invoke(args)?)
}

pub fn call_method<Recv, F, Args>(
    receiver: &Recv,
    method: &F,
    args: &str,
    options: &BindOptions,
) -> Result<ResultSet, Error>
where
    F: MethodHandler<Recv, Args>,
{
    let arguments = bind::arguments_of_method(&F::method_type(), args, options)?;
    call_method_args(receiver, method, arguments)
}

pub fn call_method_args<Recv, F, Args>(
    receiver: &Recv,
    method: &F,
    args: Arguments,
) -> Result<ResultSet, Error>
where
    F: MethodHandler<Recv, Args>,
{
    dispatch(method.invoke(receiver, args)?)
}

#[cfg(test)]
mod tests {
    use super::{Callable, Handler, dispatch};
    use crate::core::error::ErrorKind;
    use crate::core::value::{AnyValue, Arguments, Output};

    #[test]
    fn first_non_nil_error_discards_collected_outputs() {
        let outputs = vec![
            Output::value(1_i32),
            Output::Error(None),
            Output::Error(Some(crate::Error::callable("boom"))),
            Output::value(2_i32),
        ];
        let err = dispatch(outputs).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Callable);
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn nil_errors_are_kept_in_order() {
        let results = dispatch(vec![Output::value(1_i32), Output::Error(None)]).expect("results");
        assert_eq!(results.len(), 2);
        assert_eq!(results.get(0).and_then(|v| v.downcast_ref::<i32>()), Some(&1));
        assert!(results.get(1).expect("slot").is_nil());
    }

    #[test]
    fn mismatched_argument_list_is_internal() {
        let add = |a: i32, b: i32| a + b;

        let wrong = Arguments::from(vec![AnyValue::new(1_i32), AnyValue::new("2".to_string())]);
        let err = add.invoke(wrong).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.argument(), Some(1));

        let short = Arguments::from(vec![AnyValue::new(1_i32)]);
        assert_eq!(add.invoke(short).unwrap_err().kind(), ErrorKind::Internal);

        let long = Arguments::from(vec![
            AnyValue::new(1_i32),
            AnyValue::new(2_i32),
            AnyValue::new(3_i32),
        ]);
        assert_eq!(add.invoke(long).unwrap_err().kind(), ErrorKind::Internal);
    }

    #[test]
    fn callable_reports_function_type() {
        let callable = Callable::function(|name: String| name.len());
        assert!(!callable.is_method());
        let sig = callable.signature();
        assert_eq!(sig.arity(), 1);
        assert_eq!(sig.results().len(), 1);
    }
}
