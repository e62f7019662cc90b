use crate::layout::CycleLayering;
use crate::problem::{Params, Problem, RendererType};
use crate::step::Step;
use crate::theme::Palette;
use crate::tracer::{combine_step, AuxPanelTracer, GraphTracer};
use anyhow::{bail, Result};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, VecDeque};

const SOURCE: &str = "\
def leastInterval(tasks, n):
    freq = Counter(tasks)
    heap = [(-cnt, task) for task, cnt in freq.items()]
    heapq.heapify(heap)
    cooldown = deque()
    time, schedule = 0, []

    while heap or cooldown:
        time += 1
        while cooldown and cooldown[0][0] <= time:
            _, cnt, task = cooldown.popleft()
            heapq.heappush(heap, (cnt, task))
        if heap:
            cnt, task = heapq.heappop(heap)
            schedule.append(task)
            if cnt + 1 < 0:
                cooldown.append((time + n + 1, cnt + 1, task))
        else:
            schedule.append('idle')

    return len(schedule)";

const IDLE: &str = "idle";

/// Every cooldown unit can become an idle frame, so `n` is capped.
const MAX_COOLDOWN: i64 = 100;

/// Max-heap entry: highest count first, ties broken alphabetically.
type HeapEntry = (i64, Reverse<String>);

pub struct TaskScheduler;

impl TaskScheduler {
    fn preset(preset: i64) -> (Vec<&'static str>, i64) {
        match preset {
            2 => (vec!["A", "A", "A", "B", "B", "B"], 2),
            3 => (vec!["A", "C", "A", "B", "D", "B"], 1),
            _ => (vec!["A", "A", "A", "B", "B", "B", "C", "C", "D", "D", "E", "F"], 2),
        }
    }
}

struct Schedule<'a> {
    graph: GraphTracer,
    aux: AuxPanelTracer,
    steps: Vec<Step>,
    palette: &'a Palette,
}

impl Schedule<'_> {
    fn snap(&mut self, line: u32, description: String) {
        let step = self.graph.snapshot(line, description);
        self.steps.push(combine_step(&step, Some(&self.aux)));
    }

    fn show_heap(&mut self, heap: &BinaryHeap<HeapEntry>) -> Result<()> {
        let mut entries: Vec<&HeapEntry> = heap.iter().collect();
        entries.sort_by(|a, b| b.cmp(a));
        let items: Vec<(String, String)> = entries
            .into_iter()
            .map(|(cnt, Reverse(task))| (task.clone(), cnt.to_string()))
            .collect();
        self.aux.set_items("Heap", items)?;
        Ok(())
    }

    fn show_cooldown(&mut self, cooldown: &VecDeque<(i64, i64, String)>) -> Result<()> {
        let items: Vec<(String, String)> = cooldown
            .iter()
            .map(|(_, ready_at, task)| (task.clone(), format!("until t={}", ready_at)))
            .collect();
        self.aux.set_items("Cooldown", items)?;
        Ok(())
    }

    /// Draws the execution-order edge from the previous slot.
    fn link(&mut self, prev: &Option<String>, task: &str) -> Result<()> {
        if let Some(prev) = prev {
            if prev != task {
                self.graph.add_edge(prev.as_str(), task, None)?;
                self.graph.patch_edge(prev.as_str(), task)?;
            }
        }
        Ok(())
    }
}

impl Problem for TaskScheduler {
    fn name(&self) -> &'static str {
        "Task Scheduler"
    }

    fn topic(&self) -> &'static str {
        "Greedy"
    }

    fn subtopic(&self) -> &'static str {
        "Scheduling"
    }

    fn description(&self) -> &'static str {
        "LeetCode #621: Schedule tasks with cooldown using a greedy max-heap approach."
    }

    fn long_description(&self) -> &'static str {
        "Given a list of tasks (uppercase letters) and a cooldown interval `n`, find the \
         minimum number of time units the CPU will take to finish all tasks. The same task \
         must have at least `n` units of cooldown between executions.\n\n\
         Strategy: always pick the most frequent available task (greedy via max-heap). \
         If no task is available, insert an idle slot."
    }

    fn source_code(&self) -> &'static str {
        SOURCE
    }

    fn renderer_type(&self) -> RendererType {
        RendererType::Graph
    }

    fn default_params(&self) -> Params {
        Params::new().with("preset", 1)
    }

    fn generate_steps(&self, params: &Params, palette: &Palette) -> Result<Vec<Step>> {
        let (tasks, default_n) = Self::preset(params.int("preset", 1)?);
        let cooldown_n = params.int("n", default_n)?;
        if !(0..=MAX_COOLDOWN).contains(&cooldown_n) {
            bail!("cooldown n must be between 0 and {}, got {}", MAX_COOLDOWN, cooldown_n);
        }

        let mut freq: BTreeMap<&str, i64> = BTreeMap::new();
        for task in tasks.iter().copied() {
            *freq.entry(task).or_insert(0) += 1;
        }
        let task_types: Vec<&str> = freq.keys().copied().collect();

        let layering: CycleLayering = params.text("cycle_layering", CycleLayering::PerNode.as_str()).parse()?;

        let node_ids: Vec<&str> = task_types.iter().copied().chain([IDLE]).collect();
        let mut run = Schedule {
            graph: GraphTracer::new(node_ids, true)?.with_cycle_layering(layering),
            aux: AuxPanelTracer::new(),
            steps: Vec::new(),
            palette,
        };
        run.aux.add_panel("Schedule");
        run.aux.add_panel("Heap");
        run.aux.add_panel("Cooldown");

        for (task, count) in &freq {
            run.graph.set_label(*task, format!("{}({})", task, count))?;
        }
        run.graph.set_node_color(IDLE, run.palette.colors.idle.as_str())?;

        let freq_str = freq
            .iter()
            .map(|(t, c)| format!("{}:{}", t, c))
            .collect::<Vec<_>>()
            .join(", ");
        run.graph.log(format!("Tasks: {:?}", tasks));
        run.graph.log(format!("Frequencies: {}, cooldown n={}", freq_str, cooldown_n));
        run.snap(2, format!("Task frequencies: {}, n={}", freq_str, cooldown_n));

        let mut heap: BinaryHeap<HeapEntry> = freq
            .iter()
            .map(|(t, c)| (*c, Reverse(t.to_string())))
            .collect();
        run.show_heap(&heap)?;
        run.graph.log("Max-heap initialized (most frequent first)");
        run.snap(4, "Heap initialized with task frequencies".to_string());

        let mut time = 0i64;
        let mut schedule: Vec<String> = Vec::new();
        // (remaining, ready at, task), in the order tasks went cold
        let mut cooldown: VecDeque<(i64, i64, String)> = VecDeque::new();
        let mut prev: Option<String> = None;

        while !heap.is_empty() || !cooldown.is_empty() {
            time += 1;

            let mut released = Vec::new();
            while cooldown.front().map_or(false, |(_, ready_at, _)| *ready_at <= time) {
                if let Some((remaining, _, task)) = cooldown.pop_front() {
                    run.graph.set_node_color(task.as_str(), "")?;
                    run.graph.depatch_node(task.as_str())?;
                    heap.push((remaining, Reverse(task.clone())));
                    released.push(task);
                }
            }
            if !released.is_empty() {
                run.graph.log(format!("t={}: Released from cooldown: {:?}", time, released));
                run.show_cooldown(&cooldown)?;
                run.show_heap(&heap)?;
                run.snap(12, format!("t={}: {:?} back in heap", time, released));
            }

            match heap.pop() {
                Some((count, Reverse(task))) => {
                    let remaining = count - 1;
                    schedule.push(task.clone());

                    run.graph.deselect_all_nodes();
                    run.graph.select_node(task.as_str())?;
                    run.graph.set_node_color(task.as_str(), run.palette.colors.visited.as_str())?;
                    run.graph.set_label(task.as_str(), format!("{}({})", task, remaining))?;
                    run.graph.set_node_badge(task.as_str(), format!("t{}", time), run.palette.colors.accent.as_str())?;
                    run.graph.set_node_group(task.as_str(), Some(time))?;
                    run.link(&prev, &task)?;

                    run.aux.push("Schedule", task.as_str(), format!("t={}", time))?;
                    run.show_heap(&heap)?;
                    run.graph.log(format!("t={}: Execute '{}' (remaining={})", time, task, remaining));
                    run.snap(15, format!("t={}: Execute '{}'", time, task));

                    if remaining > 0 {
                        // n idle units must pass before the task may run again
                        let ready_at = time + cooldown_n + 1;
                        cooldown.push_back((remaining, ready_at, task.clone()));
                        run.graph.set_node_color(task.as_str(), run.palette.colors.cooling.as_str())?;
                        run.graph.patch_node(task.as_str())?;
                        run.show_cooldown(&cooldown)?;
                        run.graph.log(format!("  '{}' on cooldown until t={}", task, ready_at));
                        run.snap(17, format!("'{}' cooling until t={}", task, ready_at));
                    } else {
                        run.graph.set_node_color(task.as_str(), run.palette.colors.done.as_str())?;
                        run.graph.patch_node(task.as_str())?;
                        run.graph.log(format!("  '{}' fully completed!", task));
                        run.snap(15, format!("'{}' done!", task));
                    }
                    prev = Some(task);
                }
                None => {
                    schedule.push(IDLE.to_string());
                    run.graph.deselect_all_nodes();
                    run.graph.select_node(IDLE)?;
                    run.graph.set_node_badge(IDLE, format!("t{}", time), run.palette.colors.accent.as_str())?;
                    run.graph.set_node_group(IDLE, Some(time))?;
                    run.link(&prev, IDLE)?;

                    run.aux.push("Schedule", IDLE, format!("t={}", time))?;
                    run.graph.log(format!("t={}: IDLE (all tasks on cooldown)", time));
                    run.snap(19, format!("t={}: idle", time));
                    prev = Some(IDLE.to_string());
                }
            }
        }

        run.graph.set_layered_layout();
        run.graph.deselect_all_nodes();
        run.graph.deselect_all_edges();
        run.graph.log(format!("Schedule complete: {}", schedule.join(" -> ")));
        run.graph.log(format!("Total time units: {}", schedule.len()));
        run.aux.clear_panel("Heap")?;
        run.aux.clear_panel("Cooldown")?;
        run.snap(21, format!("Done! Total time = {}", schedule.len()));

        Ok(run.steps)
    }
}
