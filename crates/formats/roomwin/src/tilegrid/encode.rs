use super::{TileGrid, SENTINEL_TILE, TRAILER_OPCODE};
use crate::cursor::Writer;

/// Encode the legacy uncompressed stream: raw rows of 32-bit tile IDs.
pub fn encode_raw(w: &mut Writer, grid: &TileGrid) {
    for &tile in grid.cells() {
        w.write_u32(tile);
    }
}

/// Encode the run-length stream (2024.2+), reproducing the engine-side
/// compressor byte-for-byte.
///
/// Cells are scanned row-major. A value repeated by the following cells
/// becomes a repeat run, split at 128; non-repeating values accumulate into
/// verbatim runs, split at 127. Conceptually the scan runs against a stream
/// terminated by a virtual [`SENTINEL_TILE`] cell, which is what flushes a
/// trailing repeat run, and, when the final two real cells differ, what the
/// original compressor leaks as an extra length-2 repeat run. That trailer
/// is re-emitted here whenever the condition holds, since decoders require
/// it. With `align` (2024.4+) the stream is zero-padded to a 4-byte
/// boundary.
pub fn encode_rle(w: &mut Writer, grid: &TileGrid, align: bool) {
    let cells = grid.cells();
    let n = cells.len();

    let mut verbatim_start = None::<usize>;
    let mut i = 0;
    while i < n {
        let v = cells[i];
        let mut run = 1;
        while run < 128 && i + run < n && cells[i + run] == v {
            run += 1;
        }

        if run >= 2 {
            flush_verbatim(w, cells, verbatim_start.take(), i);
            w.write_u8(0x80 | (run as u8 - 1));
            w.write_u32(v);
            i += run;
        } else {
            if verbatim_start.is_none() {
                verbatim_start = Some(i);
            }
            i += 1;
            if i - verbatim_start.unwrap() == 127 {
                flush_verbatim(w, cells, verbatim_start.take(), i);
            }
        }
    }
    flush_verbatim(w, cells, verbatim_start.take(), n);

    if TileGrid::needs_trailer(cells) {
        w.write_u8(TRAILER_OPCODE);
        w.write_u32(SENTINEL_TILE);
    }
    if align {
        w.align4();
    }
}

fn flush_verbatim(w: &mut Writer, cells: &[u32], start: Option<usize>, end: usize) {
    let Some(start) = start else { return };
    w.write_u8((end - start) as u8);
    for &tile in &cells[start..end] {
        w.write_u32(tile);
    }
}
