//! Canvas - a flat rectangular element buffer
//!
//! A 2D array of elements addressed by (column, row). The element type is
//! left to the caller; the canvas only knows how to store and address it.
//! Rendering a canvas is the caller's job: it decides which cells changed
//! and drives an [`Encoder`](crate::Encoder) to move between them.

use super::coord::Coordinate;

/// A grid onto which elements can be painted.
///
/// Position [0,0] is the top left; storage runs left-to-right first,
/// then top-to-bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas<E> {
    /// Width in columns
    width: usize,
    /// Height in rows
    height: usize,
    /// The element buffer (row-major order)
    elements: Vec<E>,
}

impl<E: Clone + Default> Canvas<E> {
    /// Create a new canvas filled with default elements
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            elements: vec![E::default(); width * height],
        }
    }

    /// Fill every cell with a copy of `element`
    pub fn fill(&mut self, element: E) {
        for cell in &mut self.elements {
            *cell = element.clone();
        }
    }

    /// Resize the canvas, keeping whatever content still fits
    pub fn resize(&mut self, width: usize, height: usize) {
        let mut elements = vec![E::default(); width * height];
        for y in 0..height.min(self.height) {
            for x in 0..width.min(self.width) {
                elements[y * width + x] = self.elements[y * self.width + x].clone();
            }
        }
        self.width = width;
        self.height = height;
        self.elements = elements;
    }
}

impl<E> Canvas<E> {
    /// (width, height)
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Get a reference to the element at (x, y)
    pub fn get(&self, x: usize, y: usize) -> Option<&E> {
        self.index(x, y).map(|i| &self.elements[i])
    }

    /// Get a mutable reference to the element at (x, y)
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut E> {
        self.index(x, y).map(|i| &mut self.elements[i])
    }

    /// Set the element at (x, y). Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, element: E) {
        if let Some(cell) = self.get_mut(x, y) {
            *cell = element;
        }
    }

    /// Get iterator over all elements with their positions
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, &E)> {
        let width = self.width;
        self.elements
            .iter()
            .enumerate()
            .map(move |(i, element)| (Coordinate::new(i % width, i / width), element))
    }

    /// The elements of one row, left to right
    pub fn row(&self, y: usize) -> Option<&[E]> {
        if y < self.height {
            Some(&self.elements[y * self.width..(y + 1) * self.width])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_new() {
        let canvas: Canvas<char> = Canvas::new(80, 24);
        assert_eq!(canvas.size(), (80, 24));
        assert_eq!(canvas.get(79, 23), Some(&'\0'));
        assert_eq!(canvas.get(80, 0), None);
        assert_eq!(canvas.get(0, 24), None);
    }

    #[test]
    fn test_canvas_set_get() {
        let mut canvas = Canvas::new(10, 5);
        canvas.set(3, 2, 'X');
        *canvas.get_mut(4, 2).unwrap() = 'Y';
        canvas.set(10, 2, 'Z');

        assert_eq!(canvas.get(3, 2), Some(&'X'));
        assert_eq!(canvas.get(4, 2), Some(&'Y'));
        assert_eq!(&canvas.row(2).unwrap()[3..5], &['X', 'Y']);
    }

    #[test]
    fn test_canvas_iter_is_row_major() {
        let mut canvas = Canvas::new(3, 2);
        canvas.set(1, 1, 7u8);

        let positions: Vec<Coordinate> = canvas.iter().map(|(pos, _)| pos).collect();
        assert_eq!(positions[0], Coordinate::new(0, 0));
        assert_eq!(positions[3], Coordinate::new(0, 1));

        let (pos, _) = canvas.iter().find(|(_, v)| **v == 7).unwrap();
        assert_eq!(pos, Coordinate::new(1, 1));
    }

    #[test]
    fn test_canvas_resize_keeps_content() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill('.');
        canvas.set(1, 1, '#');
        canvas.set(3, 3, '@');

        canvas.resize(2, 6);
        assert_eq!(canvas.size(), (2, 6));
        assert_eq!(canvas.get(1, 1), Some(&'#'));
        assert_eq!(canvas.get(0, 3), Some(&'.'));
        assert_eq!(canvas.get(0, 5), Some(&'\0'));
        assert_eq!(canvas.get(3, 3), None);
    }
}
