use crate::error::{Result, TracerError};
use crate::log_buffer::LogBuffer;
use crate::step::{ArrayCell, Step, Visual};
use crate::value::Value;

/// Mutable 1D array of slot overlay state, for sorting and searching.
#[derive(Debug, Clone)]
pub struct Array1DTracer {
    cells: Vec<ArrayCell>,
    log: LogBuffer,
}

impl Array1DTracer {
    pub fn new<I, V>(data: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Array1DTracer {
            cells: data
                .into_iter()
                .map(|v| ArrayCell {
                    value: v.into(),
                    ..Default::default()
                })
                .collect(),
            log: LogBuffer::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    fn cell_mut(&mut self, index: usize) -> Result<&mut ArrayCell> {
        let len = self.cells.len();
        self.cells
            .get_mut(index)
            .ok_or(TracerError::IndexOutOfRange { index, len })
    }

    fn check(&self, index: usize) -> Result<()> {
        if index >= self.cells.len() {
            return Err(TracerError::IndexOutOfRange {
                index,
                len: self.cells.len(),
            });
        }
        Ok(())
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.cells.get(index).map(|c| &c.value)
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        self.cell_mut(index)?.value = value.into();
        Ok(())
    }

    /// Exchanges the values of two slots. Overlay flags stay in place.
    pub fn swap(&mut self, i: usize, j: usize) -> Result<()> {
        self.check(i)?;
        self.check(j)?;
        if i != j {
            let vi = std::mem::take(&mut self.cells[i].value);
            let vj = std::mem::replace(&mut self.cells[j].value, vi);
            self.cells[i].value = vj;
        }
        Ok(())
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        self.cell_mut(index)?.selected = true;
        Ok(())
    }

    pub fn deselect(&mut self, index: usize) -> Result<()> {
        self.cell_mut(index)?.selected = false;
        Ok(())
    }

    pub fn deselect_all(&mut self) {
        self.cells.iter_mut().for_each(|c| c.selected = false);
    }

    pub fn patch(&mut self, index: usize) -> Result<()> {
        self.cell_mut(index)?.patched = true;
        Ok(())
    }

    pub fn depatch(&mut self, index: usize) -> Result<()> {
        self.cell_mut(index)?.patched = false;
        Ok(())
    }

    pub fn depatch_all(&mut self) {
        self.cells.iter_mut().for_each(|c| c.patched = false);
    }

    pub fn mark_error(&mut self, index: usize) -> Result<()> {
        self.cell_mut(index)?.error = true;
        Ok(())
    }

    pub fn clear_error(&mut self, index: usize) -> Result<()> {
        self.cell_mut(index)?.error = false;
        Ok(())
    }

    pub fn clear_all_errors(&mut self) {
        self.cells.iter_mut().for_each(|c| c.error = false);
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.log.push(message);
    }

    pub fn snapshot(&self, line_number: u32, description: impl Into<String>) -> Step {
        Step::new(
            line_number,
            description,
            Visual::Array(self.cells.clone()),
            self.log.window(),
        )
    }
}
