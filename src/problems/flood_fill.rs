use crate::problem::{Params, Problem, RendererType};
use crate::step::{ArrowDir, Step};
use crate::theme::Palette;
use crate::tracer::Board2DTracer;
use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SOURCE: &str = "\
def floodFill(image, sr, sc, color):
    orig = image[sr][sc]
    if orig == color:
        return image
    m, n = len(image), len(image[0])

    def dfs(r, c):
        if r < 0 or r >= m or c < 0 or c >= n:
            return
        if image[r][c] != orig:
            return
        image[r][c] = color
        dfs(r + 1, c)
        dfs(r - 1, c)
        dfs(r, c + 1)
        dfs(r, c - 1)

    dfs(sr, sc)
    return image";

const PRESET_GRID: [[i64; 7]; 7] = [
    [1, 1, 1, 0, 0, 1, 1],
    [1, 1, 1, 0, 0, 0, 1],
    [1, 1, 0, 0, 1, 1, 1],
    [0, 0, 0, 1, 1, 1, 0],
    [1, 1, 0, 1, 1, 0, 0],
    [1, 1, 1, 1, 0, 0, 1],
    [1, 0, 1, 1, 1, 1, 1],
];

/// Neighbor order of the recursion, with the arrow pointing back to the caller.
const MOVES: [(i64, i64, ArrowDir); 4] = [
    (1, 0, ArrowDir::Up),
    (-1, 0, ArrowDir::Down),
    (0, 1, ArrowDir::Left),
    (0, -1, ArrowDir::Right),
];

pub struct FloodFill;

impl FloodFill {
    fn grid(preset: i64, seed: i64, size: i64) -> Result<Vec<Vec<i64>>> {
        match preset {
            2 => {
                if !(1..=50).contains(&size) {
                    bail!("size must be between 1 and 50, got {}", size);
                }
                let mut rng = StdRng::seed_from_u64(seed as u64);
                let mut grid: Vec<Vec<i64>> = (0..size)
                    .map(|_| (0..size).map(|_| i64::from(rng.gen_bool(0.6))).collect())
                    .collect();
                grid[0][0] = 1;
                Ok(grid)
            }
            _ => Ok(PRESET_GRID.iter().map(|row| row.to_vec()).collect()),
        }
    }
}

struct Fill<'a> {
    image: Vec<Vec<i64>>,
    orig: i64,
    color: i64,
    filled: usize,
    tracer: Board2DTracer,
    steps: Vec<Step>,
    palette: &'a Palette,
}

impl Fill<'_> {
    fn snap(&mut self, line: u32, description: String) {
        self.steps.push(self.tracer.snapshot(line, description));
    }

    fn dfs(&mut self, r: i64, c: i64, arrived_from: Option<ArrowDir>) -> Result<()> {
        let (m, n) = (self.image.len() as i64, self.image[0].len() as i64);
        if r < 0 || r >= m || c < 0 || c >= n {
            return Ok(());
        }
        let (ru, cu) = (r as usize, c as usize);
        if self.image[ru][cu] != self.orig {
            self.tracer.log(format!("  Skip ({},{}): not original color", r, c));
            return Ok(());
        }

        self.tracer.deselect_all();
        self.tracer.select(ru, cu)?;
        self.tracer.set_arrow(ru, cu, arrived_from)?;
        self.tracer.log(format!("Visit ({},{})", r, c));
        self.snap(10, format!("Visit ({},{})", r, c));

        self.image[ru][cu] = self.color;
        self.filled += 1;
        self.tracer.set_value(ru, cu, self.color.to_string())?;
        self.tracer.patch(ru, cu)?;
        self.tracer.deselect(ru, cu)?;
        self.tracer
            .set_overlay(ru, cu, self.filled.to_string(), self.palette.colors.visited.as_str())?;
        self.tracer.log(format!("  Fill ({},{}) -> {}", r, c, self.color));
        self.snap(12, format!("Fill ({},{}) with color {}", r, c, self.color));

        for (dr, dc, back) in MOVES {
            self.dfs(r + dr, c + dc, Some(back))?;
        }
        Ok(())
    }
}

impl Problem for FloodFill {
    fn name(&self) -> &'static str {
        "Flood Fill"
    }

    fn topic(&self) -> &'static str {
        "Graph / DFS"
    }

    fn subtopic(&self) -> &'static str {
        "Flood Fill"
    }

    fn description(&self) -> &'static str {
        "LeetCode #733: Fill connected region from a starting pixel with a new color."
    }

    fn long_description(&self) -> &'static str {
        "Given an image as an `m x n` grid, a starting pixel `(sr, sc)`, and a new `color`, \
         flood fill the image. Change the starting pixel and all 4-directionally connected \
         pixels of the same original color to the new color.\n\n\
         Presets: `grid=1` is a fixed 7x7 image, `grid=2` a random `size x size` image \
         drawn from `seed`."
    }

    fn theory(&self) -> &'static str {
        "Approach: recursive DFS from the start pixel, recoloring every 4-connected pixel \
         that still has the original color.\n\n\
         Time Complexity: O(M x N). Space Complexity: O(M x N) for the recursion stack.\n\n\
         Key Insight: when the new color equals the original one there is nothing to do, \
         and skipping that case is what keeps the recursion from looping forever."
    }

    fn source_code(&self) -> &'static str {
        SOURCE
    }

    fn renderer_type(&self) -> RendererType {
        RendererType::Board
    }

    fn default_params(&self) -> Params {
        Params::new().with("grid", 1)
    }

    fn generate_steps(&self, params: &Params, palette: &Palette) -> Result<Vec<Step>> {
        let preset = params.int("grid", 1)?;
        let image = Self::grid(preset, params.int("seed", 7)?, params.int("size", 7)?)?;
        let new_color = params.int("color", 2)?;
        let (sr, sc) = (0usize, 0usize);
        let orig = image[sr][sc];
        let (m, n) = (image.len(), image[0].len());

        let mut tracer = Board2DTracer::new(m, n);
        for (r, row) in image.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                tracer.set_value(r, c, v.to_string())?;
            }
        }

        let mut fill = Fill {
            image,
            orig,
            color: new_color,
            filled: 0,
            tracer,
            steps: Vec::new(),
            palette,
        };

        fill.tracer.log(format!(
            "Grid: {}x{}, start=({},{}), orig={}, new={}",
            m, n, sr, sc, orig, new_color
        ));
        fill.snap(2, format!("Original color at ({},{}) = {}", sr, sc, orig));

        if orig == new_color {
            fill.tracer.log("Original == new color, nothing to do");
            fill.snap(4, "No-op: same color".to_string());
            return Ok(fill.steps);
        }

        fill.dfs(sr as i64, sc as i64, None)?;

        fill.tracer.deselect_all();
        fill.tracer.clear_all_overlays();
        fill.tracer.log(format!("Flood fill complete! {} pixels filled", fill.filled));
        fill.snap(19, "Flood fill complete!".to_string());
        Ok(fill.steps)
    }
}
