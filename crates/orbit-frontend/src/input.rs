//! Translate egui input into window-level viewer events

use std::collections::BTreeMap;

use orbit_core::{ListenerKind, TouchPoint, ViewerEvent, Viewport};

/// Window event, forwarded to every session listening for its kind
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    Resize(Viewport),
    PointerMove { x: f32, y: f32 },
    TouchMove(Vec<TouchPoint>),
    Scroll(f32),
}

impl WindowEvent {
    pub fn kind(&self) -> ListenerKind {
        match self {
            Self::Resize(_) => ListenerKind::Resize,
            Self::PointerMove { .. } => ListenerKind::PointerMove,
            Self::TouchMove(_) => ListenerKind::TouchMove,
            Self::Scroll(_) => ListenerKind::Scroll,
        }
    }

    pub fn to_viewer_event(&self) -> ViewerEvent {
        match self {
            Self::Resize(viewport) => ViewerEvent::Resize(*viewport),
            Self::PointerMove { x, y } => ViewerEvent::PointerMove { x: *x, y: *y },
            Self::TouchMove(touches) => ViewerEvent::TouchMove {
                touches: touches.clone(),
            },
            Self::Scroll(offset) => ViewerEvent::Scroll { offset: *offset },
        }
    }
}

/// Tracks window size, active touches and scroll offset between frames
#[derive(Debug, Clone)]
pub struct InputTranslator {
    viewport: Viewport,
    scroll_offset: f32,
    touches: BTreeMap<u64, TouchPoint>,
}

impl InputTranslator {
    /// Start from the viewport and offset the sessions were mounted with
    pub fn new(viewport: Viewport, scroll_offset: f32) -> Self {
        Self {
            viewport,
            scroll_offset,
            touches: BTreeMap::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resize event when the window size changed
    pub fn observe_viewport(&mut self, viewport: Viewport) -> Option<WindowEvent> {
        if viewport == self.viewport {
            return None;
        }
        self.viewport = viewport;
        Some(WindowEvent::Resize(viewport))
    }

    /// Scroll event when the page offset moved
    pub fn observe_scroll(&mut self, offset: f32) -> Option<WindowEvent> {
        if (offset - self.scroll_offset).abs() < 0.5 {
            return None;
        }
        self.scroll_offset = offset;
        Some(WindowEvent::Scroll(offset))
    }

    /// Pointer and touch events of one egui frame, in order.
    ///
    /// egui also reports the first finger of a touch as a pointer; those
    /// moves are dropped while any finger is down so that touches only
    /// arrive as [`WindowEvent::TouchMove`].
    pub fn translate(&mut self, events: &[egui::Event]) -> Vec<WindowEvent> {
        let mut out = Vec::new();
        for event in events {
            match event {
                egui::Event::PointerMoved(pos) if self.touches.is_empty() => {
                    out.push(WindowEvent::PointerMove { x: pos.x, y: pos.y });
                }
                egui::Event::Touch { id, phase, pos, .. } => {
                    let point = TouchPoint { x: pos.x, y: pos.y };
                    match phase {
                        egui::TouchPhase::Start => {
                            self.touches.insert(id.0, point);
                        }
                        egui::TouchPhase::Move => {
                            self.touches.insert(id.0, point);
                            out.push(WindowEvent::TouchMove(
                                self.touches.values().copied().collect(),
                            ));
                        }
                        egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                            self.touches.remove(&id.0);
                        }
                    }
                }
                _ => {}
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(id: u64, phase: egui::TouchPhase, x: f32, y: f32) -> egui::Event {
        egui::Event::Touch {
            device_id: egui::TouchDeviceId(0),
            id: egui::TouchId(id),
            phase,
            pos: egui::pos2(x, y),
            force: None,
        }
    }

    #[test]
    fn test_resize_only_on_change() {
        let mut input = InputTranslator::new(Viewport::new(800.0, 600.0), 0.0);
        assert_eq!(input.observe_viewport(Viewport::new(800.0, 600.0)), None);
        assert_eq!(
            input.observe_viewport(Viewport::new(1024.0, 768.0)),
            Some(WindowEvent::Resize(Viewport::new(1024.0, 768.0)))
        );
        assert_eq!(input.observe_viewport(Viewport::new(1024.0, 768.0)), None);
    }

    #[test]
    fn test_scroll_emits_on_movement() {
        let mut input = InputTranslator::new(Viewport::new(800.0, 600.0), 0.0);
        assert_eq!(input.observe_scroll(0.2), None);
        assert_eq!(input.observe_scroll(40.0), Some(WindowEvent::Scroll(40.0)));
        assert_eq!(input.observe_scroll(40.0), None);
    }

    #[test]
    fn test_pointer_moves_pass_through() {
        let mut input = InputTranslator::new(Viewport::new(800.0, 600.0), 0.0);
        let events = input.translate(&[
            egui::Event::PointerMoved(egui::pos2(10.0, 20.0)),
            egui::Event::PointerGone,
            egui::Event::PointerMoved(egui::pos2(30.0, 40.0)),
        ]);
        assert_eq!(
            events,
            vec![
                WindowEvent::PointerMove { x: 10.0, y: 20.0 },
                WindowEvent::PointerMove { x: 30.0, y: 40.0 },
            ]
        );
        assert_eq!(events[0].kind(), ListenerKind::PointerMove);
    }

    #[test]
    fn test_touch_moves_carry_active_touches() {
        let mut input = InputTranslator::new(Viewport::new(800.0, 600.0), 0.0);
        let events = input.translate(&[
            touch(1, egui::TouchPhase::Start, 5.0, 5.0),
            touch(1, egui::TouchPhase::Move, 6.0, 7.0),
            touch(2, egui::TouchPhase::Start, 50.0, 50.0),
            touch(2, egui::TouchPhase::Move, 51.0, 52.0),
            touch(1, egui::TouchPhase::End, 6.0, 7.0),
            touch(2, egui::TouchPhase::Move, 53.0, 54.0),
        ]);

        assert_eq!(events.len(), 3);
        assert_eq!(events[0], WindowEvent::TouchMove(vec![TouchPoint { x: 6.0, y: 7.0 }]));
        let WindowEvent::TouchMove(pinch) = &events[1] else {
            panic!("expected a touch move");
        };
        assert_eq!(pinch.len(), 2);
        assert_eq!(
            events[2],
            WindowEvent::TouchMove(vec![TouchPoint { x: 53.0, y: 54.0 }])
        );
    }

    #[test]
    fn test_pointer_emulation_of_touch_is_dropped() {
        let mut input = InputTranslator::new(Viewport::new(800.0, 600.0), 0.0);
        // Touch first, then the emulated pointer for the first finger
        let events = input.translate(&[
            touch(1, egui::TouchPhase::Start, 10.0, 10.0),
            egui::Event::PointerMoved(egui::pos2(10.0, 10.0)),
            touch(2, egui::TouchPhase::Start, 100.0, 100.0),
            touch(1, egui::TouchPhase::Move, 700.0, 50.0),
            egui::Event::PointerMoved(egui::pos2(700.0, 50.0)),
            touch(2, egui::TouchPhase::Move, 110.0, 100.0),
        ]);

        assert!(
            events
                .iter()
                .all(|e| matches!(e, WindowEvent::TouchMove(touches) if touches.len() == 2))
        );
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_pointer_moves_resume_after_touch_ends() {
        let mut input = InputTranslator::new(Viewport::new(800.0, 600.0), 0.0);
        let events = input.translate(&[
            touch(1, egui::TouchPhase::Start, 10.0, 10.0),
            egui::Event::PointerMoved(egui::pos2(10.0, 10.0)),
            touch(1, egui::TouchPhase::Move, 20.0, 10.0),
            egui::Event::PointerMoved(egui::pos2(20.0, 10.0)),
            touch(1, egui::TouchPhase::End, 20.0, 10.0),
            egui::Event::PointerGone,
            egui::Event::PointerMoved(egui::pos2(300.0, 200.0)),
        ]);

        assert_eq!(
            events,
            vec![
                WindowEvent::TouchMove(vec![TouchPoint { x: 20.0, y: 10.0 }]),
                WindowEvent::PointerMove { x: 300.0, y: 200.0 },
            ]
        );
    }

    #[test]
    fn test_window_events_map_to_viewer_events() {
        let scroll = WindowEvent::Scroll(12.0).to_viewer_event();
        assert!(matches!(scroll, ViewerEvent::Scroll { offset } if offset == 12.0));
        let resize = WindowEvent::Resize(Viewport::new(2.0, 1.0));
        assert_eq!(resize.kind(), ListenerKind::Resize);
    }
}
