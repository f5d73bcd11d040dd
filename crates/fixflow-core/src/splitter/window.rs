//! Overlapping window planning for the parallel path.

use crate::splitter::error::ChunkError;
use crate::splitter::error::ChunkErrorKind;

/// One window of a file. `start`/`end` are 0-indexed line offsets, half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Window {
    /// 1-indexed file line of the window's first line.
    pub fn first_line(&self) -> usize {
        self.start + 1
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub(crate) fn error(&self, kind: ChunkErrorKind) -> ChunkError {
        ChunkError {
            index: self.index,
            start_line: self.start + 1,
            end_line: self.end,
            kind,
        }
    }
}

/// Plan windows of `chunk_size` lines with stride `chunk_size - overlap`.
///
/// The last window always ends exactly at `line_count`. Callers validate
/// `overlap < chunk_size` beforehand.
pub fn plan_windows(line_count: usize, chunk_size: usize, overlap: usize) -> Vec<Window> {
    let mut windows = Vec::new();
    if line_count == 0 || chunk_size == 0 || overlap >= chunk_size {
        return windows;
    }

    let stride = chunk_size - overlap;
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(line_count);
        windows.push(Window {
            index: windows.len(),
            start,
            end,
        });
        if end == line_count {
            break;
        }
        start += stride;
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(windows: &[Window]) -> Vec<(usize, usize)> {
        windows.iter().map(|w| (w.start, w.end)).collect()
    }

    #[test]
    fn test_1200_lines_three_windows() {
        let windows = plan_windows(1200, 500, 50);
        assert_eq!(ranges(&windows), vec![(0, 500), (450, 950), (900, 1200)]);
        assert_eq!(windows[2].index, 2);
    }

    #[test]
    fn test_exact_fit_single_window() {
        assert_eq!(ranges(&plan_windows(500, 500, 50)), vec![(0, 500)]);
    }

    #[test]
    fn test_last_window_ends_at_last_line() {
        let windows = plan_windows(951, 500, 50);
        assert_eq!(windows.last().unwrap().end, 951);
        assert_eq!(ranges(&windows), vec![(0, 500), (450, 950), (900, 951)]);
    }

    #[test]
    fn test_zero_overlap_tiles() {
        assert_eq!(
            ranges(&plan_windows(25, 10, 0)),
            vec![(0, 10), (10, 20), (20, 25)]
        );
    }

    #[test]
    fn test_empty_content_no_windows() {
        assert!(plan_windows(0, 500, 50).is_empty());
    }

    #[test]
    fn test_chunk_error_reports_one_indexed_lines() {
        let w = Window {
            index: 1,
            start: 450,
            end: 950,
        };
        let err = w.error(ChunkErrorKind::Cancelled);
        assert_eq!(err.start_line, 451);
        assert_eq!(err.end_line, 950);
        assert_eq!(w.first_line(), 451);
        assert_eq!(w.len(), 500);
    }
}
