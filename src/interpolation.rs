//! 테이블 보간 기본 함수 모음.
//! 1차 선형 보간/외삽과 범위 밖 처리 정책, 2차원(쌍선형) 보간을 제공한다.

use serde::{Deserialize, Serialize};

/// 하나의 (x, y) 테이블 행.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 보간 결과가 테이블 범위와 어떤 관계인지 나타낸다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeFlag {
    WithinRange,
    /// 최소 x 아래: 첫 구간 기울기로 외삽
    ExtrapolatedBelow,
    /// 최소 x 아래: 첫 점 값으로 고정
    ClampedBelow,
    /// 최대 x 위: 마지막 점 값으로 고정
    ClampedAbove,
    /// 최대 x 위: 마지막 구간 기울기로 외삽
    ExtrapolatedAbove,
}

impl RangeFlag {
    pub fn is_within(self) -> bool {
        matches!(self, RangeFlag::WithinRange)
    }
}

/// 범위 밖 입력 처리 정책. 메커니즘마다 다르게 선택한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryPolicy {
    /// 아래는 외삽 후 0 하한, 위는 마지막 값 고정, 범위 안도 0 하한.
    FloorBelowClampAbove,
    /// 양쪽 모두 끝점 값으로 고정.
    ClampBoth,
    /// 양쪽 모두 외삽하되 0 하한.
    FloorAtZero,
    /// 제한 없이 외삽.
    Unrestricted,
}

/// 정책이 적용된 보간 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolationResult {
    pub value: f64,
    pub flag: RangeFlag,
    /// 계산에 사용한 아래쪽 경계 점
    pub lower: Point,
    /// 계산에 사용한 위쪽 경계 점
    pub upper: Point,
}

/// 정렬된 점 목록에서 x를 선형 보간/외삽한다.
///
/// 점이 하나면 그 y를 그대로 반환하고, 비어 있으면 `None`.
/// 범위 밖이면 첫 구간 또는 마지막 구간의 기울기를 사용하며 값을 자르지 않는다.
pub fn interpolate(x: f64, points: &[Point]) -> Option<f64> {
    let (a, b) = bracket(x, points)?;
    Some(line(x, a, b))
}

fn bracket(x: f64, points: &[Point]) -> Option<(Point, Point)> {
    match points {
        [] => None,
        [only] => Some((*only, *only)),
        _ => {
            let last = points.len() - 2;
            let idx = points
                .windows(2)
                .position(|w| x <= w[1].x)
                .unwrap_or(last);
            Some((points[idx], points[idx + 1]))
        }
    }
}

fn line(x: f64, a: Point, b: Point) -> f64 {
    if a.x == b.x {
        return a.y;
    }
    a.y + (x - a.x) * (b.y - a.y) / (b.x - a.x)
}

/// 보간 후 정책에 따라 범위 밖 값을 처리한다.
pub fn evaluate(x: f64, points: &[Point], policy: BoundaryPolicy) -> Option<InterpolationResult> {
    let (first, last) = (*points.first()?, *points.last()?);
    let (lower, upper) = bracket(x, points)?;
    let raw = line(x, lower, upper);

    let res = if x < first.x {
        match policy {
            BoundaryPolicy::FloorBelowClampAbove => InterpolationResult {
                value: raw.max(0.0),
                flag: RangeFlag::ExtrapolatedBelow,
                lower,
                upper,
            },
            BoundaryPolicy::ClampBoth => InterpolationResult {
                value: first.y,
                flag: RangeFlag::ClampedBelow,
                lower: first,
                upper: first,
            },
            BoundaryPolicy::FloorAtZero => InterpolationResult {
                value: raw.max(0.0),
                flag: RangeFlag::ExtrapolatedBelow,
                lower,
                upper,
            },
            BoundaryPolicy::Unrestricted => InterpolationResult {
                value: raw,
                flag: RangeFlag::ExtrapolatedBelow,
                lower,
                upper,
            },
        }
    } else if x > last.x {
        match policy {
            BoundaryPolicy::FloorBelowClampAbove | BoundaryPolicy::ClampBoth => {
                InterpolationResult {
                    value: last.y,
                    flag: RangeFlag::ClampedAbove,
                    lower: last,
                    upper: last,
                }
            }
            BoundaryPolicy::FloorAtZero => InterpolationResult {
                value: raw.max(0.0),
                flag: RangeFlag::ExtrapolatedAbove,
                lower,
                upper,
            },
            BoundaryPolicy::Unrestricted => InterpolationResult {
                value: raw,
                flag: RangeFlag::ExtrapolatedAbove,
                lower,
                upper,
            },
        }
    } else {
        let value = match policy {
            BoundaryPolicy::FloorBelowClampAbove | BoundaryPolicy::FloorAtZero => raw.max(0.0),
            _ => raw,
        };
        InterpolationResult {
            value,
            flag: RangeFlag::WithinRange,
            lower,
            upper,
        }
    };
    Some(res)
}

/// x 내림차순으로 저장된 테이블(취성파괴 표 등)을 양끝 고정으로 보간한다.
pub fn interpolate_descending_clamped(x: f64, points: &[Point]) -> Option<InterpolationResult> {
    let mut asc = points.to_vec();
    sort_points(&mut asc);
    evaluate(x, &asc, BoundaryPolicy::ClampBoth)
}

/// x 기준 오름차순 정렬 후 같은 x는 첫 값만 남긴다.
pub fn sort_points(points: &mut Vec<Point>) {
    points.sort_by(|a, b| a.x.total_cmp(&b.x));
    points.dedup_by(|next, prev| next.x == prev.x);
}

/// 격자 `grid[i][j]` (i: xs, j: ys)에 대한 쌍선형 보간.
///
/// 축 값은 내림차순이어도 된다. 각 축은 `policy`에 따라 처리하며,
/// 격자 크기가 맞지 않으면 `None`.
pub fn bilinear(
    x: f64,
    y: f64,
    xs: &[f64],
    ys: &[f64],
    grid: &[Vec<f64>],
    policy: BoundaryPolicy,
) -> Option<f64> {
    if xs.is_empty() || ys.is_empty() || grid.len() != xs.len() {
        return None;
    }
    let mut column = Vec::with_capacity(xs.len());
    for (xi, row) in xs.iter().zip(grid) {
        if row.len() != ys.len() {
            return None;
        }
        let mut pts: Vec<Point> = ys.iter().zip(row).map(|(&k, &v)| Point::new(k, v)).collect();
        sort_points(&mut pts);
        column.push(Point::new(*xi, evaluate(y, &pts, policy)?.value));
    }
    sort_points(&mut column);
    Some(evaluate(x, &column, policy)?.value)
}
