/*
 * Buffer Module
 *
 * Flat per-agent storage owned by the simulation driver.
 *
 * The flock lives in two `AgentBuffer`s. During a tick the front buffer is
 * only ever borrowed shared (kernel and reducer read it) and the back buffer
 * is borrowed exclusively (kernel writes it). `DoubleBuffer::split` hands out
 * both borrows at once, so the compiler rejects any attempt to read and write
 * the same buffer inside a tick. Swapping exchanges ownership of the two
 * allocations; no agent data is copied.
 */

use rand::Rng;

use crate::boid::Transform;

/// Identity of one physical buffer allocation, stable across swaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u8);

#[derive(Clone, Debug)]
pub struct AgentBuffer {
    id: BufferId,
    transforms: Vec<Transform>,
}

impl AgentBuffer {
    pub fn new(id: BufferId, transforms: Vec<Transform>) -> Self {
        Self { id, transforms }
    }

    #[inline]
    pub fn id(&self) -> BufferId {
        self.id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Transform] {
        &self.transforms
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Transform] {
        &mut self.transforms
    }
}

impl std::ops::Index<usize> for AgentBuffer {
    type Output = Transform;

    fn index(&self, index: usize) -> &Transform {
        &self.transforms[index]
    }
}

pub struct DoubleBuffer {
    front: AgentBuffer,
    back: AgentBuffer,
}

impl DoubleBuffer {
    // Both buffers start out holding the same population
    pub fn new(initial: Vec<Transform>) -> Self {
        let back = AgentBuffer::new(BufferId(1), initial.clone());
        let front = AgentBuffer::new(BufferId(0), initial);
        Self { front, back }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.front.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.front.is_empty()
    }

    // The committed buffer: what the last tick published
    #[inline]
    pub fn front(&self) -> &AgentBuffer {
        &self.front
    }

    // Read side and write side of a tick
    #[inline]
    pub fn split(&mut self) -> (&AgentBuffer, &mut AgentBuffer) {
        (&self.front, &mut self.back)
    }

    // Publish the freshly written buffer
    #[inline]
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
    }
}

/// Per-agent phase offsets into the speed noise, fixed at creation.
#[derive(Clone, Debug, PartialEq)]
pub struct NoisePhases(Vec<f32>);

impl NoisePhases {
    // Phase range used when spawning, so agents sample distinct noise rows
    pub const SPREAD: f32 = 10.0;

    pub fn random<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Self {
        Self((0..count).map(|_| rng.gen::<f32>() * Self::SPREAD).collect())
    }

    pub fn from_vec(phases: Vec<f32>) -> Self {
        Self(phases)
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
