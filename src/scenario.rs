//! A small call graph that raises under caller-supplied conditions.
//!
//! Deterministic given its boolean input. The same program is available as
//! a static model through [`sample_index`].

use crate::analysis::{IndexError, Indexer, ProgramIndex, SourceLoc};
use crate::payload::{Accepts, PayloadKind, Record};
use crate::runtime::Runtime;
use crate::{guarded, raise, Result};

/// Raises `0` when `b`, otherwise `Record { i: 0 }`. Never returns normally.
pub fn foo(rt: &mut Runtime, b: bool) -> Result<i32> {
    rt.call("foo", |rt| {
        if b {
            raise!(rt, 0);
        }
        raise!(rt, Record { i: 0 })
    })
}

pub fn baz(rt: &mut Runtime, b: bool) -> Result<i32> {
    rt.call("baz", |rt| foo(rt, b))
}

/// Calls `foo`, itself and `baz`, then raises `0`.
///
/// `foo` always raises, so the recursion never gets past its first call.
pub fn bar(rt: &mut Runtime, b: bool) -> Result<i32> {
    rt.call("bar", |rt| {
        foo(rt, b)?;
        bar(rt, b)?;
        baz(rt, b)?;
        raise!(rt, 0)
    })
}

/// Entry point: `2` for a record, `3` for an integer, `1` for anything else.
pub fn main(rt: &mut Runtime, argc: i32) -> Result<i32> {
    rt.call("main", |rt| {
        let local = Record { i: argc };
        rt.defer("local", move || tracing::trace!(i = local.i, "release local"));

        guarded! { rt =>
            try { foo(rt, argc == 1)?; }
            catch Record(_) {
                let decl_in_catch = 2;
                return Ok(decl_in_catch);
            }
            catch i32(_xxx) { return Ok(3); }
            catch { return Ok(1); }
        }

        foo(rt, argc == 1)?;
        Ok(0)
    })
}

/// [`main`] with an inner region that takes integers only to rethrow them.
///
/// The integer reaches the outer `i32` clause unchanged.
pub fn main_rethrowing(rt: &mut Runtime, argc: i32) -> Result<i32> {
    rt.call("main", |rt| {
        guarded! { rt =>
            try {
                guarded! { rt =>
                    try { foo(rt, argc == 1)?; }
                    catch i32(_) { rethrow; }
                }
            }
            catch Record(_) { return Ok(2); }
            catch i32(_) { return Ok(3); }
            catch { return Ok(1); }
        }

        Ok(0)
    })
}

/// Process-wide initializer that raises before the entry point runs.
pub fn global_init(rt: &mut Runtime) -> Result<()> {
    foo(rt, true).map(drop)
}

/// Static model of the same program, located in the C++ sample it mirrors.
pub fn sample_index() -> core::result::Result<ProgramIndex, IndexError> {
    let at = |line, column| SourceLoc::new("sample_proj/src/main.cpp", line, column);
    let mut ix = Indexer::new();

    ix.function("foo", at(7, 1))?
        .throw(at(11, 9), PayloadKind::Int)?
        .throw(at(13, 5), PayloadKind::Record)?
        .end_function()?;

    ix.function("baz", at(17, 1))?
        .call("foo", at(19, 5))?
        .end_function()?;

    ix.function("bar", at(23, 1))?
        .call("foo", at(25, 5))?
        .call("bar", at(26, 5))?
        .call("baz", at(27, 5))?
        .throw(at(28, 5), PayloadKind::Int)?
        .call("foo", at(29, 5))?
        .end_function()?;

    ix.function("main", at(35, 1))?
        .enter_try(at(38, 5))?
        .call("foo", at(40, 9))?
        .catch(at(42, 5), Accepts::Kind(PayloadKind::Record))?
        .catch(at(47, 5), Accepts::Kind(PayloadKind::Int))?
        .catch(at(51, 5), Accepts::Any)?
        .end_try()?
        .call("foo", at(55, 5))?
        .end_function()?;

    ix.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foo_raises_by_condition() {
        let mut rt = Runtime::new();
        assert_eq!(foo(&mut rt, true).unwrap_err().kind(), PayloadKind::Int);
        assert_eq!(foo(&mut rt, false).unwrap_err().kind(), PayloadKind::Record);
    }

    #[test]
    fn test_bar_stops_at_first_call() {
        let mut rt = Runtime::new();
        let raised = bar(&mut rt, true).unwrap_err();
        assert_eq!(raised.origin(), "foo");
        assert_eq!(raised.unwound().collect::<Vec<_>>(), vec!["foo", "bar"]);
    }
}
