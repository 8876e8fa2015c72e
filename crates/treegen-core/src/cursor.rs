use crate::format::{Reader, LEAF_TAG, SPLIT_TAG};
use crate::{DecisionNode, TreeError};

/// Callbacks fired by a depth-first tree walk.
///
/// `depth` is the walker's depth register at the time of the call: `pre` sees
/// the depth of the node being entered, `mid` the depth of its children, and
/// `post` the node's own depth again.
pub trait TreeVisitor {
    type Error;

    fn pre(&mut self, depth: usize, node: &DecisionNode) -> Result<(), Self::Error>;

    fn mid(&mut self, depth: usize, node: &DecisionNode) -> Result<(), Self::Error>;

    fn post(&mut self, depth: usize, node: &DecisionNode) -> Result<(), Self::Error>;

    fn leaf(&mut self, depth: usize, value: f32) -> Result<(), Self::Error>;
}

/// Anything that can drive a [`TreeVisitor`] over a whole tree.
pub trait TreeWalk {
    fn walk<V>(&mut self, visitor: &mut V) -> Result<(), V::Error>
    where
        V: TreeVisitor,
        V::Error: From<TreeError>;
}

/// Pre-order walker over a compressed tree.
pub struct TreeCursor<'t> {
    bytes: &'t [u8],
    reader: Reader<'t>,
    depth: usize,
}

impl<'t> TreeCursor<'t> {
    pub fn new(bytes: &'t [u8]) -> Self {
        Self {
            bytes,
            reader: Reader::new(bytes),
            depth: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Walk the whole tree from the root, then insist the stream is used up.
    pub fn visit<V>(&mut self, visitor: &mut V) -> Result<(), V::Error>
    where
        V: TreeVisitor,
        V::Error: From<TreeError>,
    {
        self.reader = Reader::new(self.bytes);
        self.depth = 0;
        self.visit_node(visitor)?;
        match self.reader.remaining() {
            0 => Ok(()),
            n => Err(TreeError::TrailingBytes(n).into()),
        }
    }

    fn visit_node<V>(&mut self, visitor: &mut V) -> Result<(), V::Error>
    where
        V: TreeVisitor,
        V::Error: From<TreeError>,
    {
        let offset = self.reader.position();
        match self.reader.u8()? {
            LEAF_TAG => {
                let value = self.reader.f32()?;
                visitor.leaf(self.depth, value)
            }
            SPLIT_TAG => {
                let node = self.reader.decision()?;
                let declared = self.reader.u32()? as usize;

                visitor.pre(self.depth, &node)?;
                self.depth += 1;

                let left_start = self.reader.position();
                self.visit_node(visitor)?;
                let actual = self.reader.position() - left_start;
                if actual != declared {
                    return Err(TreeError::LeftLengthMismatch {
                        offset: left_start,
                        declared,
                        actual,
                    }
                    .into());
                }

                visitor.mid(self.depth, &node)?;
                self.visit_node(visitor)?;

                self.depth -= 1;
                visitor.post(self.depth, &node)
            }
            tag => Err(TreeError::UnknownNodeTag { tag, offset }.into()),
        }
    }
}

impl TreeWalk for TreeCursor<'_> {
    fn walk<V>(&mut self, visitor: &mut V) -> Result<(), V::Error>
    where
        V: TreeVisitor,
        V::Error: From<TreeError>,
    {
        self.visit(visitor)
    }
}
