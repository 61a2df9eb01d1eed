use crate::GridSize;
use rayon::prelude::*;
use std::mem;
use std::sync::OnceLock;

const PAR_THRESHOLD_DEFAULT: usize = 262_144;
const PAR_MIN_WORK_PER_THREAD: usize = 4096;

fn parallel_threshold() -> usize {
    static THRESHOLD: OnceLock<usize> = OnceLock::new();
    *THRESHOLD.get_or_init(|| {
        std::env::var("SIM_PAR_THRESHOLD")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(PAR_THRESHOLD_DEFAULT)
    })
}

pub(crate) fn should_parallel(len: usize) -> bool {
    if len < parallel_threshold() {
        return false;
    }
    let threads = rayon::current_num_threads().max(1);
    len / threads >= PAR_MIN_WORK_PER_THREAD
}

fn flat_at(values: &[f32], stride: usize, i: isize, j: isize) -> f32 {
    let offset = i * stride as isize + j;
    usize::try_from(offset)
        .ok()
        .and_then(|index| values.get(index))
        .copied()
        .unwrap_or(0.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    U,
    V,
    Smoke,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NeighborOpenness {
    pub left: f32,
    pub right: f32,
    pub below: f32,
    pub above: f32,
}

impl NeighborOpenness {
    pub fn sum(&self) -> f32 {
        self.left + self.right + self.below + self.above
    }
}

#[derive(Clone, Debug)]
pub struct Fluid {
    pub size: GridSize,
    pub density: f32,
    pub over_relaxation: f32,
    pub u: Vec<f32>,
    pub v: Vec<f32>,
    pub pressure: Vec<f32>,
    pub openness: Vec<f32>,
    pub smoke: Vec<f32>,
    temp_u: Vec<f32>,
    temp_v: Vec<f32>,
    temp_smoke: Vec<f32>,
}

impl Fluid {
    pub fn new(density: f32, interior_width: usize, interior_height: usize, spacing: f32) -> Self {
        let size = GridSize::with_border(interior_width, interior_height, spacing);
        let cells = size.cell_count();
        Self {
            size,
            density,
            over_relaxation: 1.9,
            u: vec![0.0; cells],
            v: vec![0.0; cells],
            pressure: vec![0.0; cells],
            openness: vec![0.0; cells],
            smoke: vec![1.0; cells],
            temp_u: vec![0.0; cells],
            temp_v: vec![0.0; cells],
            temp_smoke: vec![0.0; cells],
        }
    }

    pub fn simulate(&mut self, dt: f32, gravity: f32, iterations: usize) {
        self.integrate(dt, gravity);
        self.pressure.fill(0.0);
        self.solve_incompressibility(iterations, dt);
        self.extrapolate();
        self.advect_velocity(dt);
        self.advect_smoke(dt);
    }

    pub fn integrate(&mut self, dt: f32, gravity: f32) {
        for i in 1..self.size.width() {
            for j in 1..self.size.height() - 1 {
                let at = self.size.idx(i, j);
                let below = self.size.idx(i, j - 1);
                if self.openness[at] != 0.0 && self.openness[below] != 0.0 {
                    self.v[at] += gravity * dt;
                }
            }
        }
    }

    pub fn solve_incompressibility(&mut self, iterations: usize, dt: f32) {
        let pressure_scale = self.density * self.size.spacing() / dt;
        for _ in 0..iterations {
            for i in 1..self.size.width() - 1 {
                for j in 1..self.size.height() - 1 {
                    if !self.open(i, j) {
                        continue;
                    }
                    let neighbors = self.neighbor_openness(i, j);
                    let open_sum = neighbors.sum();
                    if open_sum == 0.0 {
                        continue;
                    }
                    let at = self.size.idx(i, j);
                    let right = self.size.idx(i + 1, j);
                    let above = self.size.idx(i, j + 1);
                    let divergence = self.u[right] - self.u[at] + self.v[above] - self.v[at];
                    let correction = -divergence / open_sum * self.over_relaxation;
                    self.pressure[at] += pressure_scale * correction;
                    self.u[at] -= neighbors.left * correction;
                    self.u[right] += neighbors.right * correction;
                    self.v[at] -= neighbors.below * correction;
                    self.v[above] += neighbors.above * correction;
                }
            }
        }
    }

    pub fn neighbor_openness(&self, i: usize, j: usize) -> NeighborOpenness {
        let stride = self.size.height();
        let (i, j) = (i as isize, j as isize);
        NeighborOpenness {
            left: flat_at(&self.openness, stride, i - 1, j),
            right: flat_at(&self.openness, stride, i + 1, j),
            below: flat_at(&self.openness, stride, i, j - 1),
            above: flat_at(&self.openness, stride, i, j + 1),
        }
    }

    pub fn extrapolate(&mut self) {
        for i in 0..self.size.width() {
            self.extrapolate_u(i);
        }
        for j in 0..self.size.height() {
            self.extrapolate_v(j);
        }
    }

    pub fn extrapolate_u(&mut self, i: usize) {
        let height = self.size.height();
        self.u[self.size.idx(i, 0)] = self.u[self.size.idx(i, 1)];
        self.u[self.size.idx(i, height - 1)] = self.u[self.size.idx(i, height - 2)];
    }

    pub fn extrapolate_v(&mut self, j: usize) {
        let width = self.size.width();
        self.v[self.size.idx(0, j)] = self.v[self.size.idx(1, j)];
        self.v[self.size.idx(width - 1, j)] = self.v[self.size.idx(width - 2, j)];
    }

    pub fn sample(&self, x: f32, y: f32, field: FieldKind) -> f32 {
        let h = self.size.spacing();
        let inv_h = 1.0 / h;
        let half_h = 0.5 * h;
        let width = self.size.width();
        let height = self.size.height();

        let x = x.min(width as f32 * h).max(h);
        let y = y.min(height as f32 * h).max(h);

        let (values, dx, dy) = match field {
            FieldKind::U => (&self.u, 0.0, half_h),
            FieldKind::V => (&self.v, half_h, 0.0),
            FieldKind::Smoke => (&self.smoke, half_h, half_h),
        };

        let x0 = (((x - dx) * inv_h).floor() as usize).min(width - 1);
        let tx = ((x - dx) - x0 as f32 * h) * inv_h;
        let x1 = (x0 + 1).min(width - 1);

        let y0 = (((y - dy) * inv_h).floor() as usize).min(height - 1);
        let ty = ((y - dy) - y0 as f32 * h) * inv_h;
        let y1 = (y0 + 1).min(height - 1);

        let sx = 1.0 - tx;
        let sy = 1.0 - ty;

        sx * sy * values[self.size.idx(x0, y0)]
            + tx * sy * values[self.size.idx(x1, y0)]
            + tx * ty * values[self.size.idx(x1, y1)]
            + sx * ty * values[self.size.idx(x0, y1)]
    }

    pub fn avg_u(&self, i: usize, j: usize) -> f32 {
        let stride = self.size.height();
        let (i, j) = (i as isize, j as isize);
        (flat_at(&self.u, stride, i, j - 1)
            + flat_at(&self.u, stride, i, j)
            + flat_at(&self.u, stride, i + 1, j - 1)
            + flat_at(&self.u, stride, i + 1, j))
            * 0.25
    }

    pub fn avg_v(&self, i: usize, j: usize) -> f32 {
        let stride = self.size.height();
        let (i, j) = (i as isize, j as isize);
        (flat_at(&self.v, stride, i - 1, j)
            + flat_at(&self.v, stride, i, j)
            + flat_at(&self.v, stride, i - 1, j + 1)
            + flat_at(&self.v, stride, i, j + 1))
            * 0.25
    }

    pub fn backtraced_u(&self, i: usize, j: usize, dt: f32) -> f32 {
        let h = self.size.spacing();
        let x = i as f32 * h - dt * self.u[self.size.idx(i, j)];
        let y = j as f32 * h + 0.5 * h - dt * self.avg_v(i, j);
        self.sample(x, y, FieldKind::U)
    }

    pub fn backtraced_v(&self, i: usize, j: usize, dt: f32) -> f32 {
        let h = self.size.spacing();
        let x = i as f32 * h + 0.5 * h - dt * self.avg_u(i, j);
        let y = j as f32 * h - dt * self.v[self.size.idx(i, j)];
        self.sample(x, y, FieldKind::V)
    }

    pub fn backtraced_smoke(&self, i: usize, j: usize, dt: f32) -> f32 {
        let stride = self.size.height();
        let (si, sj) = (i as isize, j as isize);
        let u = (flat_at(&self.u, stride, si, sj) + flat_at(&self.u, stride, si + 1, sj)) * 0.5;
        let v = (flat_at(&self.v, stride, si, sj) + flat_at(&self.v, stride, si, sj + 1)) * 0.5;
        let (x, y) = self.size.cell_center(i, j);
        self.sample(x - dt * u, y - dt * v, FieldKind::Smoke)
    }

    pub fn advect_velocity(&mut self, dt: f32) {
        let mut next_u = mem::take(&mut self.temp_u);
        let mut next_v = mem::take(&mut self.temp_v);
        next_u.copy_from_slice(&self.u);
        next_v.copy_from_slice(&self.v);

        let height = self.size.height();
        if should_parallel(next_u.len()) {
            next_u.par_iter_mut().enumerate().for_each(|(index, value)| {
                if let Some(advected) = self.advected_u_at(index / height, index % height, dt) {
                    *value = advected;
                }
            });
            next_v.par_iter_mut().enumerate().for_each(|(index, value)| {
                if let Some(advected) = self.advected_v_at(index / height, index % height, dt) {
                    *value = advected;
                }
            });
        } else {
            for i in 1..self.size.width() {
                for j in 1..height {
                    if let Some(advected) = self.advected_u_at(i, j, dt) {
                        next_u[self.size.idx(i, j)] = advected;
                    }
                    if let Some(advected) = self.advected_v_at(i, j, dt) {
                        next_v[self.size.idx(i, j)] = advected;
                    }
                }
            }
        }

        self.temp_u = mem::replace(&mut self.u, next_u);
        self.temp_v = mem::replace(&mut self.v, next_v);
    }

    pub fn advect_smoke(&mut self, dt: f32) {
        let mut next_smoke = mem::take(&mut self.temp_smoke);
        next_smoke.copy_from_slice(&self.smoke);

        let width = self.size.width();
        let height = self.size.height();
        if should_parallel(next_smoke.len()) {
            next_smoke
                .par_iter_mut()
                .enumerate()
                .for_each(|(index, value)| {
                    let (i, j) = (index / height, index % height);
                    if i >= 1 && i < width - 1 && j >= 1 && j < height - 1 && self.open(i, j) {
                        *value = self.backtraced_smoke(i, j, dt);
                    }
                });
        } else {
            for i in 1..width - 1 {
                for j in 1..height - 1 {
                    if self.open(i, j) {
                        next_smoke[self.size.idx(i, j)] = self.backtraced_smoke(i, j, dt);
                    }
                }
            }
        }

        self.temp_smoke = mem::replace(&mut self.smoke, next_smoke);
    }

    pub fn set_u(&mut self, i: usize, j: usize, value: f32) {
        let at = self.size.idx(i, j);
        self.u[at] = value;
    }

    pub fn set_v(&mut self, i: usize, j: usize, value: f32) {
        let at = self.size.idx(i, j);
        self.v[at] = value;
    }

    pub fn set_smoke(&mut self, i: usize, j: usize, value: f32) {
        let at = self.size.idx(i, j);
        self.smoke[at] = value;
    }

    pub fn open(&self, i: usize, j: usize) -> bool {
        self.openness[self.size.idx(i, j)] != 0.0
    }

    fn advected_u_at(&self, i: usize, j: usize, dt: f32) -> Option<f32> {
        let inside = i >= 1
            && j >= 1
            && j < self.size.height() - 1
            && self.open(i, j)
            && self.open(i - 1, j);
        inside.then(|| self.backtraced_u(i, j, dt))
    }

    fn advected_v_at(&self, i: usize, j: usize, dt: f32) -> Option<f32> {
        let inside = i >= 1
            && j >= 1
            && i < self.size.width() - 1
            && self.open(i, j)
            && self.open(i, j - 1);
        inside.then(|| self.backtraced_v(i, j, dt))
    }
}
