use serde::{Deserialize, Serialize};

/// Layers of one connected component
///
/// Layers are ascending from the top of the drawing, vertex ids ascending
/// inside each layer. Every layer is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentLayout {
    pub layers: Vec<Vec<usize>>,
}

impl ComponentLayout {
    pub fn vertex_count(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    pub fn vertices(&self) -> impl Iterator<Item = usize> + '_ {
        self.layers.iter().flatten().copied()
    }

    /// Index of the layer holding `vertex`
    pub fn layer_of(&self, vertex: usize) -> Option<usize> {
        self.layers
            .iter()
            .position(|layer| layer.binary_search(&vertex).is_ok())
    }
}

/// Result of laying out a graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLayout {
    /// Connected components, in discovery order
    pub components: Vec<ComponentLayout>,

    /// Edges that were reversed to break cycles, in their original direction
    pub reversed: Vec<(usize, usize)>,
}

impl GraphLayout {
    pub fn vertex_count(&self) -> usize {
        self.components.iter().map(ComponentLayout::vertex_count).sum()
    }

    /// Component and layer index holding `vertex`
    pub fn layer_of(&self, vertex: usize) -> Option<(usize, usize)> {
        self.components
            .iter()
            .enumerate()
            .find_map(|(index, component)| component.layer_of(vertex).map(|layer| (index, layer)))
    }

    pub fn is_reversed(&self, from: usize, to: usize) -> bool {
        self.reversed.binary_search(&(from, to)).is_ok()
    }
}
