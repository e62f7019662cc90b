use crate::error::{Result, TracerError};
use crate::log_buffer::LogBuffer;
use crate::step::{ArrowDir, CellState, Step, Visual};
use crate::value::Value;

/// Mutable 2D grid of cell overlay state.
///
/// Every mutator addresses a cell by `(row, col)` and rejects coordinates
/// outside the board without touching anything.
#[derive(Debug, Clone)]
pub struct Board2DTracer {
    rows: usize,
    cols: usize,
    cells: Vec<CellState>,
    log: LogBuffer,
}

impl Board2DTracer {
    pub fn new(rows: usize, cols: usize) -> Self {
        Board2DTracer {
            rows,
            cols,
            cells: vec![CellState::default(); rows * cols],
            log: LogBuffer::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn cell_mut(&mut self, row: usize, col: usize) -> Result<&mut CellState> {
        if row >= self.rows || col >= self.cols {
            return Err(TracerError::CellOutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(&mut self.cells[row * self.cols + col])
    }

    pub fn value(&self, row: usize, col: usize) -> Option<&Value> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(&self.cells[row * self.cols + col].value)
    }

    pub fn set_value(&mut self, row: usize, col: usize, value: impl Into<Value>) -> Result<()> {
        self.cell_mut(row, col)?.value = value.into();
        Ok(())
    }

    pub fn select(&mut self, row: usize, col: usize) -> Result<()> {
        self.cell_mut(row, col)?.selected = true;
        Ok(())
    }

    pub fn deselect(&mut self, row: usize, col: usize) -> Result<()> {
        self.cell_mut(row, col)?.selected = false;
        Ok(())
    }

    pub fn deselect_all(&mut self) {
        self.cells.iter_mut().for_each(|c| c.selected = false);
    }

    pub fn patch(&mut self, row: usize, col: usize) -> Result<()> {
        self.cell_mut(row, col)?.patched = true;
        Ok(())
    }

    pub fn depatch(&mut self, row: usize, col: usize) -> Result<()> {
        self.cell_mut(row, col)?.patched = false;
        Ok(())
    }

    pub fn depatch_all(&mut self) {
        self.cells.iter_mut().for_each(|c| c.patched = false);
    }

    pub fn mark_error(&mut self, row: usize, col: usize) -> Result<()> {
        self.cell_mut(row, col)?.error = true;
        Ok(())
    }

    pub fn clear_error(&mut self, row: usize, col: usize) -> Result<()> {
        self.cell_mut(row, col)?.error = false;
        Ok(())
    }

    pub fn clear_all_errors(&mut self) {
        self.cells.iter_mut().for_each(|c| c.error = false);
    }

    /// Sets the text drawn over a cell and its color (empty for the default).
    pub fn set_overlay(
        &mut self,
        row: usize,
        col: usize,
        text: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<()> {
        let cell = self.cell_mut(row, col)?;
        cell.overlay_text = text.into();
        cell.overlay_color = color.into();
        Ok(())
    }

    /// Sets or clears (`None`) the arrow drawn in a cell.
    pub fn set_arrow(&mut self, row: usize, col: usize, direction: impl Into<Option<ArrowDir>>) -> Result<()> {
        self.cell_mut(row, col)?.arrow_dir = direction.into();
        Ok(())
    }

    pub fn mark_on_path(&mut self, row: usize, col: usize) -> Result<()> {
        self.cell_mut(row, col)?.on_path = true;
        Ok(())
    }

    pub fn clear_on_path(&mut self, row: usize, col: usize) -> Result<()> {
        self.cell_mut(row, col)?.on_path = false;
        Ok(())
    }

    pub fn clear_all_paths(&mut self) {
        self.cells.iter_mut().for_each(|c| c.on_path = false);
    }

    /// Clears overlay text, overlay color and arrows. Path marks stay.
    pub fn clear_all_overlays(&mut self) {
        for cell in &mut self.cells {
            cell.overlay_text.clear();
            cell.overlay_color.clear();
            cell.arrow_dir = None;
        }
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.log.push(message);
    }

    pub fn snapshot(&self, line_number: u32, description: impl Into<String>) -> Step {
        let board: Vec<Vec<CellState>> = if self.cols == 0 {
            vec![Vec::new(); self.rows]
        } else {
            self.cells.chunks(self.cols).map(|row| row.to_vec()).collect()
        };
        Step::new(line_number, description, Visual::Board(board), self.log.window())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fresh_board_is_all_default() {
        let tracer = Board2DTracer::new(3, 4);
        let step = tracer.snapshot(1, "");
        let board = step.board().unwrap();
        assert_eq!(board.len(), 3);
        for row in board {
            assert_eq!(row.len(), 4);
            assert!(row.iter().all(|c| *c == CellState::default()));
        }
        assert!(step.log_messages.is_empty());
    }

    #[test]
    fn test_start_scenario() -> Result<()> {
        let mut tracer = Board2DTracer::new(2, 2);
        tracer.set_value(0, 0, "1")?;
        tracer.select(0, 0)?;
        let step = tracer.snapshot(1, "start");

        let expected = vec![
            vec![
                CellState {
                    value: Value::from("1"),
                    selected: true,
                    ..Default::default()
                },
                CellState::default(),
            ],
            vec![CellState::default(), CellState::default()],
        ];
        assert_eq!(step.board().unwrap(), expected.as_slice());
        assert_eq!(step.description, "start");
        assert_eq!(step.line_number, 1);
        assert!(step.log_messages.is_empty());
        Ok(())
    }

    #[test]
    fn test_select_is_idempotent() -> Result<()> {
        let mut tracer = Board2DTracer::new(1, 1);
        tracer.select(0, 0)?;
        tracer.select(0, 0)?;
        tracer.deselect(0, 0)?;
        assert!(!tracer.snapshot(1, "").board().unwrap()[0][0].selected);
        Ok(())
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut tracer = Board2DTracer::new(2, 3);
        assert_eq!(
            tracer.select(2, 0),
            Err(TracerError::CellOutOfRange { row: 2, col: 0, rows: 2, cols: 3 })
        );
        assert!(tracer.set_value(0, 3, 1).is_err());
        assert!(tracer.snapshot(1, "").board().unwrap().iter().flatten().all(|c| !c.selected));
    }

    #[test]
    fn test_clear_all_overlays_keeps_paths() -> Result<()> {
        let mut tracer = Board2DTracer::new(2, 2);
        tracer.set_overlay(0, 1, "3", "#f38ba8")?;
        tracer.set_arrow(1, 0, ArrowDir::Up)?;
        tracer.mark_on_path(1, 1)?;
        tracer.clear_all_overlays();

        let step = tracer.snapshot(2, "");
        let board = step.board().unwrap();
        assert_eq!(board[0][1].overlay_text, "");
        assert_eq!(board[0][1].overlay_color, "");
        assert_eq!(board[1][0].arrow_dir, None);
        assert!(board[1][1].on_path);

        tracer.clear_all_paths();
        assert!(!tracer.snapshot(3, "").board().unwrap()[1][1].on_path);
        Ok(())
    }

    #[test]
    fn test_snapshot_is_detached_from_later_mutation() -> Result<()> {
        let mut tracer = Board2DTracer::new(1, 2);
        tracer.log("first");
        let before = tracer.snapshot(1, "before");
        tracer.set_value(0, 1, 9)?;
        tracer.mark_error(0, 1)?;
        tracer.log("second");

        assert_eq!(before.board().unwrap()[0][1], CellState::default());
        assert_eq!(before.log_messages, vec!["first".to_string()]);
        let after = tracer.snapshot(2, "after");
        assert_eq!(after.board().unwrap()[0][1].value, Value::from(9));
        assert_eq!(after.log_messages.len(), 2);
        Ok(())
    }

    #[test]
    fn test_log_window_in_frames() {
        let mut tracer = Board2DTracer::new(1, 1);
        for i in 0..60 {
            tracer.log(format!("msg {}", i));
        }
        let step = tracer.snapshot(1, "");
        let expected: Vec<String> = (10..60).map(|i| format!("msg {}", i)).collect();
        assert_eq!(step.log_messages, expected);
    }

    #[test]
    fn test_bulk_clears() -> Result<()> {
        let mut tracer = Board2DTracer::new(2, 2);
        for r in 0..2 {
            for c in 0..2 {
                tracer.select(r, c)?;
                tracer.patch(r, c)?;
                tracer.mark_error(r, c)?;
            }
        }
        tracer.deselect_all();
        tracer.depatch_all();
        tracer.clear_error(0, 0)?;
        let step = tracer.snapshot(1, "");
        let board = step.board().unwrap();
        assert!(board.iter().flatten().all(|c| !c.selected && !c.patched));
        assert!(!board[0][0].error);
        assert!(board[1][1].error);

        tracer.clear_all_errors();
        assert!(tracer.snapshot(2, "").board().unwrap().iter().flatten().all(|c| !c.error));
        Ok(())
    }
}
