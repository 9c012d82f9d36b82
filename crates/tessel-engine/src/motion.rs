//! Boundary-reflecting horizontal motion.

use glam::Vec2;

use crate::sprite::Sprite;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// Moves a span `[x, x + width]` back and forth between two bounds.
///
/// Each step first flips direction if the span touches the bound it is heading
/// for, then moves by `velocity * dt`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PingPong {
    direction: Direction,
    velocity: f32,
    lower: f32,
    upper: f32,
}

impl PingPong {
    pub const DEFAULT_VELOCITY: f32 = 0.2;

    pub fn new(velocity: f32) -> Self {
        Self {
            direction: Direction::Forward,
            velocity,
            lower: 0.0,
            upper: 1.0,
        }
    }

    pub fn with_bounds(mut self, lower: f32, upper: f32) -> Self {
        debug_assert!(lower <= upper);
        self.lower = lower;
        self.upper = upper;
        self
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.lower, self.upper)
    }

    /// Returns the next `x`.
    pub fn step(&mut self, x: f32, width: f32, dt: f32) -> f32 {
        match self.direction {
            Direction::Forward if x + width >= self.upper => self.direction = Direction::Backward,
            Direction::Backward if x <= self.lower => self.direction = Direction::Forward,
            _ => {}
        }

        let delta = self.velocity * dt;
        match self.direction {
            Direction::Forward => x + delta,
            Direction::Backward => x - delta,
        }
    }

    /// Steps `sprite` horizontally; `y` is left alone.
    pub fn apply(&mut self, sprite: &mut Sprite, dt: f32) {
        let position = sprite.position();
        let x = self.step(position.x, sprite.size().x, dt);
        sprite.set_position(Vec2::new(x, position.y));
    }
}

impl Default for PingPong {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VELOCITY)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::gpu::{HeadlessGpu, PixelBuffer};
    use crate::shader::ShaderProgram;
    use crate::texture::Texture;

    const WIDTH: f32 = 0.3;
    const DT: f32 = 0.1;

    fn run_until(pp: &mut PingPong, mut x: f32, done: impl Fn(f32) -> bool) -> f32 {
        for _ in 0..1000 {
            if done(x) {
                return x;
            }
            x = pp.step(x, WIDTH, DT);
        }
        panic!("bound never reached");
    }

    #[test]
    fn moves_forward_inside_bounds() {
        let mut pp = PingPong::default();
        let x = pp.step(0.2, WIDTH, DT);
        assert!((x - 0.22).abs() < 1e-6);
        assert_eq!(pp.direction(), Direction::Forward);
    }

    #[test]
    fn reflects_at_upper_bound() {
        let mut pp = PingPong::default();
        let x = run_until(&mut pp, 0.0, |x| x + WIDTH >= 1.0);
        assert_eq!(pp.direction(), Direction::Forward);

        let next = pp.step(x, WIDTH, DT);
        assert_eq!(pp.direction(), Direction::Backward);
        assert!(next < x);
    }

    #[test]
    fn reflects_at_lower_bound() {
        let mut pp = PingPong::default();
        let x = run_until(&mut pp, 0.0, |x| x + WIDTH >= 1.0);
        let x = pp.step(x, WIDTH, DT);
        let x = run_until(&mut pp, x, |x| x <= 0.0);
        assert_eq!(pp.direction(), Direction::Backward);

        let next = pp.step(x, WIDTH, DT);
        assert_eq!(pp.direction(), Direction::Forward);
        assert!(next > x);
    }

    #[test]
    fn custom_bounds() {
        let mut pp = PingPong::new(1.0).with_bounds(-2.0, 2.0);
        assert_eq!(pp.step(1.5, 0.5, 0.5), 1.0);
        assert_eq!(pp.direction(), Direction::Backward);
        assert_eq!(pp.step(-2.0, 0.5, 0.5), -1.5);
        assert_eq!(pp.direction(), Direction::Forward);
    }

    #[test]
    fn apply_moves_sprite_horizontally() {
        let (gpu, _) = HeadlessGpu::shared();
        let shader = Rc::new(ShaderProgram::sprite(&gpu).unwrap());
        let texture = Rc::new(Texture::from_pixels(&gpu, &PixelBuffer::solid(1, 1, [0; 4])).unwrap());
        let mut sprite =
            Sprite::new(&gpu, Vec2::new(0.0, 0.7), Vec2::new(WIDTH, WIDTH), shader, texture).unwrap();

        let mut pp = PingPong::default();
        pp.apply(&mut sprite, 0.5);
        assert!((sprite.position().x - 0.1).abs() < 1e-6);
        assert_eq!(sprite.position().y, 0.7);
    }
}
