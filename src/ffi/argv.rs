use crate::argv::{Argument, ArgumentVector};
use crate::error::ContractViolation;
use crate::ffi::{input, length, status, RedisShimStatus};

/// Argument vector under construction, opaque to the host
#[derive(Debug)]
pub struct RedisShimArgv {
    pub(crate) inner: ArgumentVector,
}

/// Allocates an argument vector with `count` unset slots
///
/// # Safety
/// `out_argv` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn RedisShim_ArgvNew(count: i64, out_argv: *mut *mut RedisShimArgv) -> RedisShimStatus {
    let count = match length(count) {
        Ok(count) => count,
        Err(violation) => return violation.into(),
    };
    if out_argv.is_null() {
        return ContractViolation::NullPointer("out_argv").into();
    }

    let argv = Box::new(RedisShimArgv {
        inner: ArgumentVector::with_slots(count),
    });
    unsafe { out_argv.write(Box::into_raw(argv)) };
    RedisShimStatus::Ok
}

/// Copies `len` bytes of `data` into slot `index`. Embedded zero bytes are kept.
///
/// # Safety
/// `argv` must be null or returned by [RedisShim_ArgvNew] and not yet consumed.
/// `data` must be valid for reads of `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn RedisShim_ArgvSet(
    argv: *mut RedisShimArgv,
    index: i64,
    data: *const u8,
    len: i64,
) -> RedisShimStatus {
    status(unsafe { set_argument(argv, index, data, len) })
}

unsafe fn set_argument(argv: *mut RedisShimArgv, index: i64, data: *const u8, len: i64) -> Result<(), ContractViolation> {
    let argv = unsafe { argv.as_mut() }.ok_or(ContractViolation::NullPointer("argv"))?;
    let index = length(index)?;
    let data = unsafe { input(data, len, "data") }?;

    argv.inner.set(index, Argument::from_slice(data)?)
}

/// Releases an argument vector that was never passed to `RedisShim_Command`
///
/// # Safety
/// `argv` must be null or returned by [RedisShim_ArgvNew] and not yet consumed.
#[no_mangle]
pub unsafe extern "C" fn RedisShim_ArgvFree(argv: *mut RedisShimArgv) {
    if !argv.is_null() {
        drop(unsafe { Box::from_raw(argv) });
    }
}
