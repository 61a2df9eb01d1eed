use crate::Fluid;

const SCENE_DENSITY: f32 = 1000.0;
const DEFAULT_DT: f32 = 1.0 / 60.0;
const DEFAULT_ITERATIONS: usize = 40;
const DEFAULT_OBSTACLE_RADIUS: f32 = 0.085;
const WIND_TUNNEL_INFLOW: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneKind {
    Tank,
    WindTunnel,
    Paint,
}

impl SceneKind {
    pub fn label(&self) -> &'static str {
        match self {
            SceneKind::Tank => "TANK",
            SceneKind::WindTunnel => "WIND TUNNEL",
            SceneKind::Paint => "PAINT",
        }
    }

    fn resolution(&self) -> usize {
        match self {
            SceneKind::Tank => 50,
            SceneKind::WindTunnel | SceneKind::Paint => 100,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObstacleShape {
    Circle,
    Square,
    Triangle,
    Oval,
}

impl ObstacleShape {
    pub fn label(&self) -> &'static str {
        match self {
            ObstacleShape::Circle => "CIRCLE",
            ObstacleShape::Square => "SQUARE",
            ObstacleShape::Triangle => "TRIANGLE",
            ObstacleShape::Oval => "OVAL",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ObstacleShape::Circle => ObstacleShape::Square,
            ObstacleShape::Square => ObstacleShape::Triangle,
            ObstacleShape::Triangle => ObstacleShape::Oval,
            ObstacleShape::Oval => ObstacleShape::Circle,
        }
    }

    pub fn covers(&self, dx: f32, dy: f32, radius: f32) -> bool {
        match self {
            ObstacleShape::Circle => dx * dx + dy * dy < radius * radius,
            ObstacleShape::Square => dx.abs() < radius && dy.abs() < radius,
            ObstacleShape::Triangle => dx.abs() < radius && dy.abs() < radius && dx >= dy.abs(),
            ObstacleShape::Oval => {
                let rx = radius * 1.5;
                let ry = radius;
                (dx * dx) / (rx * rx) + (dy * dy) / (ry * ry) < 1.0
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub fluid: Fluid,
    pub kind: SceneKind,
    pub shape: ObstacleShape,
    pub gravity: f32,
    pub dt: f32,
    pub iterations: usize,
    pub obstacle_radius: f32,
    pub show_pressure: bool,
    pub show_smoke: bool,
    pub obstacle: Option<Obstacle>,
    pub frame: u64,
}

impl Scene {
    pub fn new(kind: SceneKind, shape: ObstacleShape) -> Self {
        let resolution = kind.resolution();
        let spacing = 1.0 / resolution as f32;
        let mut scene = Self {
            fluid: Fluid::new(SCENE_DENSITY, 2 * resolution, resolution, spacing),
            kind,
            shape,
            gravity: 0.0,
            dt: DEFAULT_DT,
            iterations: DEFAULT_ITERATIONS,
            obstacle_radius: DEFAULT_OBSTACLE_RADIUS,
            show_pressure: false,
            show_smoke: true,
            obstacle: None,
            frame: 0,
        };
        match kind {
            SceneKind::Tank => scene.setup_tank(),
            SceneKind::WindTunnel => scene.setup_wind_tunnel(),
            SceneKind::Paint => scene.setup_paint(),
        }
        scene
    }

    pub fn step(&mut self) {
        self.fluid.simulate(self.dt, self.gravity, self.iterations);
        self.frame += 1;
    }

    pub fn place_obstacle(&mut self, x: f32, y: f32) {
        self.obstacle = Some(Obstacle {
            x,
            y,
            radius: self.obstacle_radius,
        });
        self.paint_obstacle(x, y, 0.0, 0.0);
    }

    pub fn drag_obstacle(&mut self, x: f32, y: f32) {
        let (vx, vy) = match self.obstacle {
            Some(previous) => ((x - previous.x) / self.dt, (y - previous.y) / self.dt),
            None => (0.0, 0.0),
        };
        self.obstacle = Some(Obstacle {
            x,
            y,
            radius: self.obstacle_radius,
        });
        self.paint_obstacle(x, y, vx, vy);
    }

    pub fn set_shape(&mut self, shape: ObstacleShape) {
        self.shape = shape;
        match self.obstacle {
            Some(current) => self.drag_obstacle(current.x, current.y),
            None => self.place_obstacle(1.0, 0.5),
        }
    }

    fn setup_tank(&mut self) {
        let width = self.fluid.size.width();
        let height = self.fluid.size.height();
        for i in 0..width {
            for j in 0..height {
                let wall = i == 0 || i == width - 1 || j == 0;
                self.fluid.openness[self.fluid.size.idx(i, j)] = if wall { 0.0 } else { 1.0 };
            }
        }
        self.gravity = -9.81;
        self.show_pressure = true;
        self.show_smoke = false;
    }

    fn setup_wind_tunnel(&mut self) {
        let width = self.fluid.size.width();
        let height = self.fluid.size.height();
        for i in 0..width {
            for j in 0..height {
                let wall = i == 0 || j == 0 || j == height - 1;
                let at = self.fluid.size.idx(i, j);
                self.fluid.openness[at] = if wall { 0.0 } else { 1.0 };
                if i == 1 {
                    self.fluid.u[at] = WIND_TUNNEL_INFLOW;
                }
            }
        }

        let stripe = 0.1 * height as f32;
        let lowest = (0.5 * height as f32 - 0.5 * stripe).floor() as usize;
        let highest = (0.5 * height as f32 + 0.5 * stripe).floor() as usize;
        for j in lowest..highest {
            self.fluid.smoke[self.fluid.size.idx(0, j)] = 0.0;
        }

        self.gravity = 0.0;
        self.show_pressure = false;
        self.show_smoke = true;
        self.place_obstacle(1.0, 0.5);
    }

    fn setup_paint(&mut self) {
        self.gravity = 0.0;
        self.fluid.over_relaxation = 1.0;
        self.show_pressure = false;
        self.show_smoke = true;
    }

    fn paint_obstacle(&mut self, x: f32, y: f32, vx: f32, vy: f32) {
        let pulse = (self.kind == SceneKind::Paint)
            .then(|| 0.5 + 0.5 * (0.1 * self.frame as f32).sin());
        let radius = self.obstacle_radius;
        let width = self.fluid.size.width();
        let height = self.fluid.size.height();

        for i in 1..width - 2 {
            for j in 1..height - 2 {
                let at = self.fluid.size.idx(i, j);
                self.fluid.openness[at] = 1.0;

                let (cx, cy) = self.fluid.size.cell_center(i, j);
                let (dx, dy) = (cx - x, cy - y);
                if !self.shape.covers(dx, dy, radius) {
                    continue;
                }

                self.fluid.openness[at] = 0.0;
                match pulse {
                    Some(value) => self.fluid.smoke[at] = value,
                    None => {
                        let flipped = self.shape == ObstacleShape::Triangle && dy < 0.0;
                        let vy_cell = if flipped { -vy } else { vy };
                        self.fluid.smoke[at] = 1.0;
                        self.fluid.u[at] = vx;
                        self.fluid.u[self.fluid.size.idx(i + 1, j)] = vx;
                        self.fluid.v[at] = vy_cell;
                        self.fluid.v[self.fluid.size.idx(i, j + 1)] = vy_cell;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    #[test]
    fn tank_closes_sides_and_floor_but_not_top() {
        let scene = Scene::new(SceneKind::Tank, ObstacleShape::Circle);
        let size = scene.fluid.size;
        assert_eq!(size.width(), 102);
        assert_eq!(size.height(), 52);
        for j in 0..size.height() {
            assert_eq!(scene.fluid.openness[size.idx(0, j)], 0.0);
            assert_eq!(scene.fluid.openness[size.idx(size.width() - 1, j)], 0.0);
        }
        for i in 1..size.width() - 1 {
            assert_eq!(scene.fluid.openness[size.idx(i, 0)], 0.0);
            assert_eq!(scene.fluid.openness[size.idx(i, size.height() - 1)], 1.0);
        }
        assert_close(scene.gravity, -9.81, 1e-6);
        assert!(scene.show_pressure);
        assert!(!scene.show_smoke);
    }

    #[test]
    fn wind_tunnel_sets_inflow_stripe_and_obstacle() {
        let scene = Scene::new(SceneKind::WindTunnel, ObstacleShape::Circle);
        let size = scene.fluid.size;
        assert_eq!(size.width(), 202);
        assert_eq!(size.height(), 102);
        for j in 1..size.height() - 1 {
            assert_eq!(scene.fluid.openness[size.idx(0, j)], 0.0);
            assert_close(scene.fluid.u[size.idx(1, j)], WIND_TUNNEL_INFLOW, 1e-6);
        }
        for i in 1..size.width() - 1 {
            assert_eq!(scene.fluid.openness[size.idx(i, 0)], 0.0);
            assert_eq!(scene.fluid.openness[size.idx(i, size.height() - 1)], 0.0);
        }
        assert_eq!(scene.fluid.smoke[size.idx(0, 51)], 0.0);
        assert_eq!(scene.fluid.smoke[size.idx(0, 10)], 1.0);
        assert!(scene.obstacle.is_some());
        assert_eq!(scene.fluid.openness[size.idx(100, 50)], 0.0);
        assert_eq!(scene.fluid.openness[size.idx(10, 50)], 1.0);
        assert_close(scene.gravity, 0.0, 1e-6);
        assert!(scene.show_smoke);
    }

    #[test]
    fn paint_scene_lowers_relaxation_and_stays_closed() {
        let scene = Scene::new(SceneKind::Paint, ObstacleShape::Circle);
        assert_close(scene.fluid.over_relaxation, 1.0, 1e-6);
        assert!(scene.fluid.openness.iter().all(|value| *value == 0.0));
        assert!(scene.show_smoke);
        assert!(!scene.show_pressure);
    }

    #[test]
    fn dragging_imprints_drag_velocity_and_reopens_old_cells() {
        let mut scene = Scene::new(SceneKind::WindTunnel, ObstacleShape::Circle);
        let size = scene.fluid.size;
        scene.drag_obstacle(1.2, 0.5);
        let expected_vx = (1.2 - 1.0) / scene.dt;
        assert_close(scene.fluid.u[size.idx(119, 50)], expected_vx, 1e-3);
        assert_eq!(scene.fluid.openness[size.idx(119, 50)], 0.0);
        assert_eq!(scene.fluid.openness[size.idx(100, 50)], 1.0);
    }

    #[test]
    fn triangle_flips_imprinted_v_below_its_center() {
        let mut scene = Scene::new(SceneKind::WindTunnel, ObstacleShape::Circle);
        let size = scene.fluid.size;
        scene.set_shape(ObstacleShape::Triangle);
        scene.drag_obstacle(1.0, 0.6);
        let expected_vy = (0.6 - 0.5) / scene.dt;
        assert_close(scene.fluid.v[size.idx(103, 62)], expected_vy, 1e-3);
        assert_close(scene.fluid.v[size.idx(103, 58)], -expected_vy, 1e-3);
    }

    #[test]
    fn paint_scene_paints_pulsing_smoke_without_velocity() {
        let mut scene = Scene::new(SceneKind::Paint, ObstacleShape::Circle);
        let size = scene.fluid.size;
        scene.place_obstacle(1.0, 0.5);
        assert_close(scene.fluid.smoke[size.idx(100, 50)], 0.5, 1e-6);
        assert_eq!(scene.fluid.openness[size.idx(100, 50)], 0.0);
        assert_eq!(scene.fluid.u[size.idx(100, 50)], 0.0);
        assert_eq!(scene.fluid.openness[size.idx(10, 10)], 1.0);
        assert_eq!(scene.fluid.openness[size.idx(0, 10)], 0.0);
    }

    #[test]
    fn shape_cycle_visits_all_shapes() {
        let mut shape = ObstacleShape::Circle;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(shape);
            shape = shape.next();
        }
        assert_eq!(shape, ObstacleShape::Circle);
        assert_eq!(seen.len(), 4);
        assert!(seen.contains(&ObstacleShape::Oval));
    }
}
