use crate::problem::{Params, Problem, RendererType};
use crate::step::Step;
use crate::theme::Palette;
use crate::tracer::{combine_step, Array1DTracer, AuxPanelTracer};
use anyhow::{anyhow, bail, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SOURCE: &str = "\
def bubbleSort(nums):
    n = len(nums)
    for i in range(n - 1):
        swapped = False
        for j in range(n - 1 - i):
            if nums[j] > nums[j + 1]:
                nums[j], nums[j + 1] = nums[j + 1], nums[j]
                swapped = True
        if not swapped:
            break
    return nums";

pub struct BubbleSort;

impl BubbleSort {
    fn input(params: &Params) -> Result<Vec<i64>> {
        let custom = params.text("nums", "");
        if !custom.trim().is_empty() {
            return custom
                .split(',')
                .map(|s| {
                    s.trim()
                        .parse::<i64>()
                        .map_err(|_| anyhow!("Invalid number '{}' in nums", s.trim()))
                })
                .collect();
        }
        match params.int("preset", 1)? {
            2 => {
                let size = params.int("size", 8)?;
                if !(1..=30).contains(&size) {
                    bail!("size must be between 1 and 30, got {}", size);
                }
                let mut rng = StdRng::seed_from_u64(params.int("seed", 7)? as u64);
                Ok((0..size).map(|_| rng.gen_range(1..=99)).collect())
            }
            3 => Ok(vec![1, 2, 3, 4, 5]),
            _ => Ok(vec![5, 1, 4, 2, 8, 3]),
        }
    }
}

impl Problem for BubbleSort {
    fn name(&self) -> &'static str {
        "Bubble Sort"
    }

    fn topic(&self) -> &'static str {
        "Sorting"
    }

    fn subtopic(&self) -> &'static str {
        "Comparison Sorts"
    }

    fn description(&self) -> &'static str {
        "Repeatedly swap adjacent out-of-order elements until the array is sorted."
    }

    fn long_description(&self) -> &'static str {
        "Sort an array of integers in ascending order by sweeping it from left to right and \
         swapping neighbours that are out of order. After pass `i` the largest `i + 1` \
         elements sit in their final place at the end. A pass without swaps ends the sort \
         early.\n\n\
         Pass `nums=3,1,2` to sort your own numbers."
    }

    fn theory(&self) -> &'static str {
        "Time Complexity: O(N^2) comparisons in the worst case, O(N) on sorted input thanks \
         to the early exit. Space Complexity: O(1).\n\n\
         Key Insight: bubble sort is stable because equal neighbours are never swapped."
    }

    fn source_code(&self) -> &'static str {
        SOURCE
    }

    fn renderer_type(&self) -> RendererType {
        RendererType::Array
    }

    fn default_params(&self) -> Params {
        Params::new().with("preset", 1)
    }

    fn generate_steps(&self, params: &Params, _palette: &Palette) -> Result<Vec<Step>> {
        let mut nums = Self::input(params)?;
        let n = nums.len();

        let mut array = Array1DTracer::new(nums.iter().copied());
        let mut aux = AuxPanelTracer::new();
        aux.add_panel("Stats");
        aux.set_items("Stats", [("comparisons", 0usize), ("swaps", 0)])?;
        let mut steps = Vec::new();
        let mut snap = |array: &Array1DTracer, aux: &AuxPanelTracer, line: u32, description: String| {
            steps.push(combine_step(&array.snapshot(line, description), Some(aux)));
        };

        array.log(format!("nums = {:?}", nums));
        snap(&array, &aux, 2, format!("n = {}", n));

        let (mut comparisons, mut swaps) = (0usize, 0usize);
        for i in 0..n.saturating_sub(1) {
            let mut swapped = false;
            array.log(format!("Pass {}", i + 1));
            for j in 0..n - 1 - i {
                comparisons += 1;
                array.deselect_all();
                array.select(j)?;
                array.select(j + 1)?;
                aux.set_items("Stats", [("comparisons", comparisons), ("swaps", swaps)])?;
                snap(&array, &aux, 6, format!("Compare nums[{}]={} and nums[{}]={}", j, nums[j], j + 1, nums[j + 1]));

                if nums[j] > nums[j + 1] {
                    nums.swap(j, j + 1);
                    array.swap(j, j + 1)?;
                    swaps += 1;
                    swapped = true;
                    aux.set_items("Stats", [("comparisons", comparisons), ("swaps", swaps)])?;
                    array.log(format!("  swap {} and {}", nums[j + 1], nums[j]));
                    snap(&array, &aux, 7, format!("Swap positions {} and {}", j, j + 1));
                }
            }
            array.deselect_all();
            array.patch(n - 1 - i)?;
            snap(&array, &aux, 5, format!("{} is in its final place", nums[n - 1 - i]));

            if !swapped {
                array.log(format!("No swaps in pass {}, stopping early", i + 1));
                snap(&array, &aux, 10, "Already sorted".to_string());
                break;
            }
        }

        array.deselect_all();
        for k in 0..n {
            array.patch(k)?;
        }
        array.log(format!("sorted = {:?}", nums));
        aux.select_item("Stats", 1)?;
        snap(&array, &aux, 11, format!("Sorted with {} swaps", swaps));
        Ok(steps)
    }
}
