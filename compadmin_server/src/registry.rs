use std::any::Any;
use std::fmt;
use std::iter::Enumerate;
use std::panic::{self, AssertUnwindSafe};
use std::slice;

use compadmin_types::{InvokeError, MethodFailure, Signature, TypeToken};
use index_vec::{define_index_type, IndexVec};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

define_index_type! {pub struct MethodId = u32;}

pub type Handler<C> = Box<dyn Fn(&C, &[String]) -> Result<Value, InvokeError> + Send + Sync>;

/// A raw argument that can be bound to a parameter of a registered operation.
pub trait FromArg: Sized {
    const TOKEN: TypeToken;

    fn from_arg(raw: &str) -> Option<Self>;
}

impl FromArg for i32 {
    const TOKEN: TypeToken = TypeToken::Int;

    fn from_arg(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl FromArg for f64 {
    const TOKEN: TypeToken = TypeToken::Double;

    fn from_arg(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl FromArg for f32 {
    const TOKEN: TypeToken = TypeToken::Float;

    fn from_arg(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl FromArg for i64 {
    const TOKEN: TypeToken = TypeToken::Long;

    fn from_arg(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl FromArg for String {
    const TOKEN: TypeToken = TypeToken::String;

    fn from_arg(raw: &str) -> Option<Self> {
        Some(raw.to_owned())
    }
}

pub struct Method<C> {
    pub name: String,
    pub signature: Signature,
    handler: Handler<C>,
}

impl<C> fmt::Debug for Method<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.signature)
    }
}

/// Operations a component exposes, keyed by name and parameter types.
pub struct Registry<C> {
    methods: IndexVec<MethodId, Method<C>>,
    by_name: IndexMap<String, Vec<MethodId>>,
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self {
            methods: IndexVec::new(),
            by_name: IndexMap::new(),
        }
    }
}

fn check_arity(expected: usize, args: &[String]) -> Result<(), InvokeError> {
    if args.len() != expected {
        return Err(InvokeError::ArgumentCount {
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

fn bind_next<T: FromArg>(args: &mut Enumerate<slice::Iter<'_, String>>) -> Result<T, InvokeError> {
    let (index, raw) = args
        .next()
        .ok_or_else(|| InvokeError::Failed("argument list exhausted".to_owned()))?;
    T::from_arg(raw).ok_or_else(|| InvokeError::BadArgument {
        index,
        token: raw.clone(),
        expected: T::TOKEN,
    })
}

fn finish<R: Serialize, E: fmt::Display>(res: Result<R, E>) -> Result<Value, InvokeError> {
    match res {
        Ok(ret) => Ok(serde_json::to_value(ret).unwrap_or(Value::Null)),
        Err(e) => Err(MethodFailure::new(e).into()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

// generates registerN for handlers taking N typed parameters.
// arity is checked up front, binding then walks the args in order.
macro_rules! typed_register {
    ($fn_name:ident; $($arg:ident: $ty:ident),*) => {
        pub fn $fn_name<$($ty,)* R, E, F>(&mut self, name: &str, f: F) -> MethodId
        where
            $($ty: FromArg,)*
            R: Serialize,
            E: fmt::Display,
            F: Fn(&C, $($ty),*) -> Result<R, E> + Send + Sync + 'static,
        {
            let signature = Signature::new(vec![$($ty::TOKEN),*]);
            let expected = signature.len();
            self.add(name, signature, move |target: &C, args: &[String]| {
                check_arity(expected, args)?;
                #[allow(unused_mut, unused_variables)]
                let mut args = args.iter().enumerate();
                $(let $arg = bind_next::<$ty>(&mut args)?;)*
                finish(f(target, $($arg),*))
            })
        }
    };
}

impl<C: 'static> Registry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler working on raw argument text. Registering the same
    /// name and signature twice replaces the earlier handler.
    pub fn add<F>(&mut self, name: &str, signature: Signature, handler: F) -> MethodId
    where
        F: Fn(&C, &[String]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        if let Some(id) = self.resolve(name, &signature) {
            warn!("replacing handler for {}{}", name, signature);
            self.methods[id].handler = Box::new(handler);
            return id;
        }

        let id = self.methods.push(Method {
            name: name.to_owned(),
            signature,
            handler: Box::new(handler),
        });
        self.by_name.entry(name.to_owned()).or_default().push(id);
        id
    }

    typed_register!(register0;);
    typed_register!(register1; a: A1);
    typed_register!(register2; a: A1, b: A2);
    typed_register!(register3; a: A1, b: A2, c: A3);

    pub fn resolve(&self, name: &str, signature: &Signature) -> Option<MethodId> {
        self.by_name
            .get(name)?
            .iter()
            .copied()
            .find(|id| self.methods[*id].signature == *signature)
    }

    pub fn get(&self, id: MethodId) -> &Method<C> {
        &self.methods[id]
    }

    /// Every overload registered under `name`, in registration order.
    pub fn overloads(&self, name: &str) -> Vec<&Method<C>> {
        match self.by_name.get(name) {
            Some(ids) => ids.iter().map(|id| &self.methods[*id]).collect(),
            None => Vec::new(),
        }
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method<C>> {
        self.methods.iter()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Runs a resolved handler. A panicking handler is reported as
    /// `InvokeError::Panicked` instead of unwinding into the caller.
    pub fn invoke(&self, id: MethodId, target: &C, args: &[String]) -> Result<Value, InvokeError> {
        let method = &self.methods[id];
        match panic::catch_unwind(AssertUnwindSafe(|| (method.handler)(target, args))) {
            Ok(res) => res,
            Err(payload) => Err(InvokeError::Panicked(panic_message(&*payload))),
        }
    }
}
