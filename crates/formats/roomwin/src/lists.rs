//! List serialization.
//!
//! Two variants exist in the format:
//!
//! - **Simple list**: u32 count followed by the elements inline, fixed
//!   stride.
//! - **Pointer list**: u32 count, a table of that many u32 absolute element
//!   offsets, then the element bodies. Bodies are written sequentially after
//!   the table, but readers must follow the recorded offsets; nothing
//!   guarantees physical order.

use crate::cursor::{Cursor, Writer};
use crate::error::{Error, Result};

/// Read a pointer list, invoking `read_one` with the cursor positioned at
/// each element's recorded offset.
///
/// A zero offset with a non-zero declared count is a corrupt file.
pub fn read_pointer_list<T>(
    c: &mut Cursor,
    context: &'static str,
    mut read_one: impl FnMut(&mut Cursor) -> Result<T>,
) -> Result<Vec<T>> {
    let table_offset = c.position();
    let count = c.read_u32()? as usize;
    let mut offsets = Vec::with_capacity(count);
    for _ in 0..count {
        offsets.push(c.read_u32()?);
    }

    let mut items = Vec::with_capacity(count);
    for offset in offsets {
        if offset == 0 {
            return Err(Error::NullPointer {
                offset: table_offset,
                context,
            });
        }
        c.jump(offset as usize);
        items.push(read_one(c)?);
        c.ret();
    }
    Ok(items)
}

/// Walk a pointer list without materializing elements: `visit` is called with
/// the cursor at each element offset. Returns the element count.
///
/// Shares the jump discipline of [`read_pointer_list`] so the counting pass
/// advances over exactly the same bytes as the real reader.
pub fn walk_pointer_list(
    c: &mut Cursor,
    context: &'static str,
    mut visit: impl FnMut(&mut Cursor) -> Result<()>,
) -> Result<u64> {
    let table_offset = c.position();
    let count = c.read_u32()? as usize;
    let mut offsets = Vec::with_capacity(count);
    for _ in 0..count {
        offsets.push(c.read_u32()?);
    }
    for offset in offsets {
        if offset == 0 {
            return Err(Error::NullPointer {
                offset: table_offset,
                context,
            });
        }
        c.jump(offset as usize);
        visit(c)?;
        c.ret();
    }
    Ok(count as u64)
}

/// Write a pointer list: count, placeholder table, then each element body,
/// backpatching the table entry with the body's absolute offset.
///
/// The writer must be positioned at an absolute file offset (see
/// [`crate::form::FormWriter`]).
pub fn write_pointer_list<T>(
    w: &mut Writer,
    items: &[T],
    mut write_one: impl FnMut(&mut Writer, &T) -> Result<()>,
) -> Result<()> {
    w.write_u32(items.len() as u32);
    let table = w.position();
    for _ in items {
        w.write_u32(0);
    }
    for (i, item) in items.iter().enumerate() {
        let body = w.position();
        w.patch_u32(table + i * 4, body as u32);
        write_one(w, item)?;
    }
    Ok(())
}

/// Read a simple list with element reader `read_one`.
pub fn read_simple_list<T>(
    c: &mut Cursor,
    mut read_one: impl FnMut(&mut Cursor) -> Result<T>,
) -> Result<Vec<T>> {
    let count = c.read_u32()? as usize;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(read_one(c)?);
    }
    Ok(items)
}

/// Write a simple list with element writer `write_one`.
pub fn write_simple_list<T>(
    w: &mut Writer,
    items: &[T],
    mut write_one: impl FnMut(&mut Writer, &T) -> Result<()>,
) -> Result<()> {
    w.write_u32(items.len() as u32);
    for item in items {
        write_one(w, item)?;
    }
    Ok(())
}

/// Read a simple list of raw u32 values.
pub fn read_u32_list(c: &mut Cursor) -> Result<Vec<u32>> {
    read_simple_list(c, |c| c.read_u32())
}

/// Write a simple list of raw u32 values.
pub fn write_u32_list(w: &mut Writer, items: &[u32]) {
    w.write_u32(items.len() as u32);
    for &v in items {
        w.write_u32(v);
    }
}
