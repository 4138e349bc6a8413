use crate::error::ContractViolation;
use crate::ffi::registry::{registry, RedisShimReply};
use crate::ffi::{length, output, status, write_out, RedisShimOutcome, RedisShimStatus};
use crate::reply::{copy_element_payload, copy_full_payload, flatten_path, take_payload};
use core::slice;

/// Flattens element `index` of an array reply
///
/// Payloads fitting `buffer` (including NUL terminator) are copied, otherwise `deferred` is set and
/// the payload can be fetched with [RedisShim_CopyElementPayload].
///
/// # Safety
/// `buffer` must be valid for writes of `capacity` bytes, `out_outcome` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn RedisShim_ArrayElement(
    reply: RedisShimReply,
    index: i64,
    buffer: *mut u8,
    capacity: i64,
    out_outcome: *mut RedisShimOutcome,
) -> RedisShimStatus {
    status(unsafe { element(reply, &[index], buffer, capacity, out_outcome) })
}

/// Flattens a nested element, addressed by `depth` indexes starting at the top level array
///
/// # Safety
/// `path` must be valid for reads of `depth` values. See also [RedisShim_ArrayElement].
#[no_mangle]
pub unsafe extern "C" fn RedisShim_NestedElement(
    reply: RedisShimReply,
    path: *const i64,
    depth: i64,
    buffer: *mut u8,
    capacity: i64,
    out_outcome: *mut RedisShimOutcome,
) -> RedisShimStatus {
    let path = match unsafe { index_path(path, depth) } {
        Ok(path) => path,
        Err(violation) => return violation.into(),
    };

    status(unsafe { element(reply, path, buffer, capacity, out_outcome) })
}

/// Copies the complete payload of a deferred reply. `capacity` must be at least the payload length.
///
/// # Safety
/// `buffer` must be valid for writes of `capacity` bytes.
#[no_mangle]
pub unsafe extern "C" fn RedisShim_CopyPayload(reply: RedisShimReply, buffer: *mut u8, capacity: i64) -> RedisShimStatus {
    let out = match unsafe { output(buffer, capacity, "buffer") } {
        Ok(out) => out,
        Err(violation) => return violation.into(),
    };

    // Registry lock must be released before the violation is logged
    let result = registry().get(reply).and_then(|handle| copy_full_payload(handle, out));
    status(result.map(|_| ()))
}

/// Copies the complete payload of element `index`
///
/// # Safety
/// `buffer` must be valid for writes of `capacity` bytes.
#[no_mangle]
pub unsafe extern "C" fn RedisShim_CopyElementPayload(
    reply: RedisShimReply,
    index: i64,
    buffer: *mut u8,
    capacity: i64,
) -> RedisShimStatus {
    let index = match length(index) {
        Ok(index) => index,
        Err(violation) => return violation.into(),
    };
    let out = match unsafe { output(buffer, capacity, "buffer") } {
        Ok(out) => out,
        Err(violation) => return violation.into(),
    };

    let result = registry()
        .get(reply)
        .and_then(|handle| copy_element_payload(handle, &[index], out));
    status(result.map(|_| ()))
}

/// Copies the complete payload and releases the reply
///
/// The key is stale afterwards, also if copying failed.
///
/// # Safety
/// `buffer` must be valid for writes of `capacity` bytes.
#[no_mangle]
pub unsafe extern "C" fn RedisShim_TakePayload(reply: RedisShimReply, buffer: *mut u8, capacity: i64) -> RedisShimStatus {
    let handle = registry().remove(reply);
    let handle = match handle {
        Ok(handle) => handle,
        Err(violation) => return violation.into(),
    };

    match unsafe { output(buffer, capacity, "buffer") } {
        Ok(out) => status(take_payload(handle, out).map(|_| ())),
        Err(violation) => {
            handle.release();
            violation.into()
        }
    }
}

/// Releases the reply including all nested elements
///
/// Releasing twice is reported as contract violation.
#[no_mangle]
pub extern "C" fn RedisShim_ReleaseReply(reply: RedisShimReply) -> RedisShimStatus {
    let handle = registry().remove(reply);
    match handle {
        Ok(handle) => {
            handle.release();
            RedisShimStatus::Ok
        }
        Err(violation) => violation.into(),
    }
}

unsafe fn element(
    reply: RedisShimReply,
    path: &[i64],
    buffer: *mut u8,
    capacity: i64,
    out_outcome: *mut RedisShimOutcome,
) -> Result<(), ContractViolation> {
    if out_outcome.is_null() {
        return Err(ContractViolation::NullPointer("out_outcome"));
    }

    let path = path.iter().map(|&index| length(index)).collect::<Result<Vec<_>, _>>()?;
    let buffer = unsafe { output(buffer, capacity, "buffer") }?;

    let outcome = flatten_path(registry().get(reply)?, &path, buffer)?;
    unsafe { write_out(out_outcome, RedisShimOutcome::from(outcome), "out_outcome") }
}

unsafe fn index_path<'a>(path: *const i64, depth: i64) -> Result<&'a [i64], ContractViolation> {
    let depth = length(depth)?;
    if depth == 0 {
        return Ok(&[]);
    }
    if path.is_null() {
        return Err(ContractViolation::NullPointer("path"));
    }

    Ok(unsafe { slice::from_raw_parts(path, depth) })
}
