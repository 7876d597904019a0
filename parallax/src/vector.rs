use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, MulAssign, Sub};

/// 二维向量 - 偏移、速度和指针位置共用
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// 每个分量夹取到 `[-limit, +limit]`
    pub fn clamp_symmetric(self, limit: Vec2) -> Self {
        Self {
            x: self.x.max(-limit.x).min(limit.x),
            y: self.y.max(-limit.y).min(limit.y),
        }
    }

    /// 两个分量的绝对值都不超过 `eps`
    pub fn within(self, eps: f64) -> bool {
        self.x.abs() <= eps && self.y.abs() <= eps
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl MulAssign<f64> for Vec2 {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_symmetric_limits_each_axis() {
        let v = Vec2::new(120.0, -80.0).clamp_symmetric(Vec2::new(100.0, 50.0));
        assert_eq!(v, Vec2::new(100.0, -50.0));

        let v = Vec2::new(3.0, 4.0).clamp_symmetric(Vec2::ZERO);
        assert_eq!(v, Vec2::ZERO);
    }

    #[test]
    fn within_checks_both_components() {
        assert!(Vec2::new(0.01, -0.01).within(0.01));
        assert!(!Vec2::new(0.0, 0.02).within(0.01));
    }
}
