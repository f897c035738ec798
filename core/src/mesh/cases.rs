use super::cells::CellPoint::{self, *};

// Triangle fan per cell configuration (bit3 = topLeft ... bit0 = bottomLeft).
// Each fan is emitted as (p0, p[i-1], p[i]) for i in 2..len.
pub const CASES: [&[CellPoint]; 16] = [
    // 0: empty
    &[],
    // 1 point
    &[CentreBottom, BottomLeft, CentreLeft],
    &[CentreRight, BottomRight, CentreBottom],
    // 3
    &[CentreRight, BottomRight, BottomLeft, CentreLeft],
    &[CentreTop, TopRight, CentreRight],
    // 5: opposite corners
    &[CentreTop, TopRight, CentreRight, CentreBottom, BottomLeft, CentreLeft],
    &[CentreTop, TopRight, BottomRight, CentreBottom],
    // 7
    &[CentreTop, TopRight, BottomRight, BottomLeft, CentreLeft],
    &[TopLeft, CentreTop, CentreLeft],
    &[TopLeft, CentreTop, CentreBottom, BottomLeft],
    // 10: opposite corners
    &[TopLeft, CentreTop, CentreRight, BottomRight, CentreBottom, CentreLeft],
    &[TopLeft, CentreTop, CentreRight, BottomRight, BottomLeft],
    &[TopLeft, TopRight, CentreRight, CentreLeft],
    &[TopLeft, TopRight, CentreRight, CentreBottom, BottomLeft],
    &[TopLeft, TopRight, BottomRight, CentreBottom, CentreLeft],
    // 15: full quad
    &[TopLeft, TopRight, BottomRight, BottomLeft],
];

#[inline]
pub fn fan(configuration: u8) -> &'static [CellPoint] {
    CASES[(configuration & 0xF) as usize]
}
