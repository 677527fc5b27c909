use crate::channel::AnimationChannel;

/// An ordered set of channels played together.
///
/// Channel order is insertion order; removal keeps the relative order of the
/// remaining channels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animation {
    pub id: String,
    channels: Vec<AnimationChannel>,
}

impl Animation {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            channels: Vec::new(),
        }
    }

    /// Appends a channel and returns its index.
    pub fn add(&mut self, channel: AnimationChannel) -> usize {
        self.channels.push(channel);
        self.channels.len() - 1
    }

    /// Removes and returns the channel at `index`.
    pub fn remove(&mut self, index: usize) -> Option<AnimationChannel> {
        (index < self.channels.len()).then(|| self.channels.remove(index))
    }

    /// Keeps only the channels for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&AnimationChannel) -> bool) {
        self.channels.retain(keep);
    }

    #[inline]
    #[must_use]
    pub fn channel(&self, index: usize) -> Option<&AnimationChannel> {
        self.channels.get(index)
    }

    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut AnimationChannel> {
        self.channels.get_mut(index)
    }

    #[inline]
    #[must_use]
    pub fn channels(&self) -> &[AnimationChannel] {
        &self.channels
    }

    #[inline]
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Channels animating the given target, in order.
    pub fn channels_for<'a>(
        &'a self,
        target_id: &'a str,
    ) -> impl Iterator<Item = &'a AnimationChannel> {
        self.channels.iter().filter(move |c| c.target_id() == target_id)
    }

    /// Latest key time over all channels.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.channels
            .iter()
            .filter_map(|c| c.key_times().last().copied())
            .fold(0.0_f32, f32::max)
    }
}

/// The animations collected for one export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animations {
    animations: Vec<Animation>,
}

impl Animations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, animation: Animation) -> usize {
        self.animations.push(animation);
        self.animations.len() - 1
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Animation> {
        self.animations.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Animation> {
        self.animations.get_mut(index)
    }

    /// Finds an animation by identifier.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Animation> {
        self.animations.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Animation> {
        self.animations.iter_mut()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.animations.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

impl<'a> IntoIterator for &'a Animations {
    type Item = &'a Animation;
    type IntoIter = std::slice::Iter<'a, Animation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut Animations {
    type Item = &'a mut Animation;
    type IntoIter = std::slice::IterMut<'a, Animation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
