//! C-ABI runtime for compiled ember programs.
//!
//! Every string-returning entry point writes into one shared static buffer
//! and returns a pointer into it: the pointer is valid only until the next
//! call into the runtime. Compiled programs are single-threaded, so the
//! buffer is never contended.

use std::cell::UnsafeCell;
use std::ffi::{c_char, c_float, c_int, CStr};
use std::io::{self, Read, Write};

const BUFFER_SIZE: usize = 255;

struct SharedBuffer(UnsafeCell<[u8; BUFFER_SIZE]>);

// Single-threaded by the language's execution model; see module docs.
unsafe impl Sync for SharedBuffer {}

static BUFFER: SharedBuffer = SharedBuffer(UnsafeCell::new([0; BUFFER_SIZE]));

unsafe fn buffer() -> &'static mut [u8; BUFFER_SIZE] {
    &mut *BUFFER.0.get()
}

/// Copies `bytes` into the shared buffer, truncating to capacity, and
/// returns the buffer pointer.
unsafe fn fill_buffer(bytes: &[u8]) -> *mut c_char {
    let buf = buffer();
    let len = bytes.len().min(BUFFER_SIZE - 1);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf[len] = 0;
    buf.as_mut_ptr() as *mut c_char
}

/// Writes the string to stdout. Returns 0.
///
/// # Safety
/// `s` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn str_print(s: *const c_char) -> c_int {
    if s.is_null() {
        return 0;
    }
    let bytes = CStr::from_ptr(s).to_bytes();
    let mut stdout = io::stdout();
    let _ = stdout.write_all(bytes);
    let _ = stdout.flush();
    0
}

/// Reads up to `min(n + 1, 255) - 1` bytes from stdin, stopping after a
/// newline; a trailing newline is stripped. Returns the shared buffer.
///
/// # Safety
/// The returned pointer is invalidated by the next runtime call.
#[no_mangle]
pub unsafe extern "C" fn str_read(n: c_int) -> *mut c_char {
    let limit = (n.saturating_add(1).max(0) as usize).min(BUFFER_SIZE);
    let buf = buffer();
    buf[0] = 0;

    if limit > 1 {
        let stdin = io::stdin();
        let mut handle = stdin.lock();
        let mut byte = [0u8; 1];
        let mut len = 0;

        while len < limit - 1 {
            match handle.read(&mut byte) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    buf[len] = byte[0];
                    len += 1;
                    if byte[0] == b'\n' {
                        break;
                    }
                }
            }
        }

        if len > 0 && buf[len - 1] == b'\n' {
            len -= 1;
        }
        buf[len] = 0;
    }

    buf.as_mut_ptr() as *mut c_char
}

/// Byte length of the string; 0 for null.
///
/// # Safety
/// `s` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn str_len(s: *const c_char) -> c_int {
    if s.is_null() {
        return 0;
    }
    CStr::from_ptr(s).to_bytes().len() as c_int
}

/// Byte at `index`, or NUL when the index is out of range or the string is
/// null.
///
/// # Safety
/// `s` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn str_at(s: *const c_char, index: c_int) -> c_char {
    if s.is_null() || index < 0 {
        return 0;
    }
    let bytes = CStr::from_ptr(s).to_bytes();
    match bytes.get(index as usize) {
        Some(&byte) => byte as c_char,
        None => 0,
    }
}

/// Substring `[start, end)` with `end` clamped to the length; an empty
/// string for out-of-range bounds or null input. Returns the shared buffer.
///
/// # Safety
/// `s` must be null or a valid NUL-terminated string; the returned pointer
/// is invalidated by the next runtime call.
#[no_mangle]
pub unsafe extern "C" fn str_sub(s: *const c_char, start: c_int, end: c_int) -> *mut c_char {
    let buf = buffer();
    buf[0] = 0;
    let empty = buf.as_mut_ptr() as *mut c_char;

    if s.is_null() {
        return empty;
    }

    let bytes = CStr::from_ptr(s).to_bytes();
    let len = bytes.len() as c_int;
    if start < 0 || end < start || start >= len {
        return empty;
    }

    let end = end.min(len);
    fill_buffer(&bytes[start as usize..end as usize])
}

/// Offset of the first occurrence of `needle` in `haystack`, or -1.
///
/// # Safety
/// Both pointers must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn str_find(haystack: *const c_char, needle: *const c_char) -> c_int {
    if haystack.is_null() || needle.is_null() {
        return -1;
    }

    let haystack = CStr::from_ptr(haystack).to_bytes();
    let needle = CStr::from_ptr(needle).to_bytes();
    if needle.is_empty() {
        return 0;
    }

    haystack
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| offset as c_int)
        .unwrap_or(-1)
}

/// Decimal rendering of `value` in the shared buffer.
///
/// # Safety
/// The returned pointer is invalidated by the next runtime call.
#[no_mangle]
pub unsafe extern "C" fn int_to_str(value: c_int) -> *mut c_char {
    fill_buffer(value.to_string().as_bytes())
}

/// Permissive decimal parse: leading whitespace and a sign are accepted,
/// parsing stops at the first non-digit. 0 for null or no digits.
///
/// # Safety
/// `s` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn str_to_int(s: *const c_char) -> c_int {
    if s.is_null() {
        return 0;
    }

    let bytes = CStr::from_ptr(s).to_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }

    let negative = match bytes.get(i) {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        value = value * 10 + i64::from(bytes[i] - b'0');
        if value > i64::from(c_int::MAX) + 1 {
            value = i64::from(c_int::MAX) + 1;
            break;
        }
        i += 1;
    }

    if negative {
        (-value).max(i64::from(c_int::MIN)) as c_int
    } else {
        value.min(i64::from(c_int::MAX)) as c_int
    }
}

/// `%f` rendering of `value` in the shared buffer.
///
/// # Safety
/// The returned pointer is invalidated by the next runtime call.
#[no_mangle]
pub unsafe extern "C" fn float_to_str(value: c_float) -> *mut c_char {
    fill_buffer(format!("{:.6}", f64::from(value)).as_bytes())
}

/// Permissive float parse over the longest valid prefix. 0.0 for null or no
/// digits.
///
/// # Safety
/// `s` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn str_to_float(s: *const c_char) -> c_float {
    if s.is_null() {
        return 0.0;
    }

    let bytes = CStr::from_ptr(s).to_bytes();
    let mut start = 0;
    while start < bytes.len() && bytes[start].is_ascii_whitespace() {
        start += 1;
    }

    let mut end = start;
    if matches!(bytes.get(end), Some(b'-') | Some(b'+')) {
        end += 1;
    }

    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return 0.0;
    }

    // Exponent only counts when at least one digit follows it.
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'-') | Some(b'+')) {
            exp_end += 1;
        }
        if bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
                exp_end += 1;
            }
            end = exp_end;
        }
    }

    std::str::from_utf8(&bytes[start..end])
        .ok()
        .and_then(|text| text.parse::<c_float>().ok())
        .unwrap_or(0.0)
}

/// 1 when the strings are byte-equal, else 0.
///
/// # Safety
/// Both pointers must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn str_cmp(a: *const c_char, b: *const c_char) -> c_int {
    if a.is_null() || b.is_null() {
        return (a.is_null() && b.is_null()) as c_int;
    }
    (CStr::from_ptr(a).to_bytes() == CStr::from_ptr(b).to_bytes()) as c_int
}
