//! Post-load reference resolution.
//!
//! Reading leaves every cross-resource reference as a raw ID. This pass runs
//! once per load, after all pools are populated: it binds references to pool
//! entries, and converts the raw instance IDs of instance layers into either
//! an index into the owning room's instance list or a synthesized
//! *nonexistent* placeholder. Nothing here aborts: dangling IDs degrade to
//! placeholders or stay unresolved and are tallied in the report.

use std::collections::HashMap;

use crate::chunks::room::{GameObject, LayerPayload, ResolvedInstance, Room};

/// Pool sizes the resolution pass binds against. A pool whose chunk is
/// absent from the file is simply empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct PoolSizes {
    pub sprites: usize,
    pub tilesets: usize,
    pub objects: usize,
    pub code: usize,
    pub sequences: usize,
}

/// What the resolution pass found.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionReport {
    /// References bound to a pool entry (none-sentinels included).
    pub resolved: usize,
    /// References whose ID fell outside the target pool.
    pub unresolved: usize,
    /// Placeholders synthesized for dangling instance IDs.
    pub placeholders: usize,
}

/// Resolve every reference in `rooms` against the given pools.
pub fn resolve_rooms(rooms: &mut [Room], pools: &PoolSizes) -> ResolutionReport {
    let mut report = ResolutionReport::default();
    for room in rooms {
        resolve_room(room, pools, &mut report);
    }
    if report.unresolved > 0 || report.placeholders > 0 {
        log::warn!(
            "resolution left {} unresolved reference(s), {} placeholder(s)",
            report.unresolved,
            report.placeholders
        );
    }
    report
}

fn tally(report: &mut ResolutionReport, ok: bool) {
    if ok {
        report.resolved += 1;
    } else {
        report.unresolved += 1;
    }
}

fn resolve_room(room: &mut Room, pools: &PoolSizes, report: &mut ResolutionReport) {
    tally(report, room.creation_code.bind(pools.code));

    for bg in &mut room.backgrounds {
        tally(report, bg.definition.bind(pools.tilesets));
    }
    for view in &mut room.views {
        tally(report, view.follow_object.bind(pools.objects));
    }
    for obj in &mut room.instances {
        resolve_game_object(obj, pools, report);
    }
    for tile in &mut room.legacy_tiles {
        resolve_tile(tile, pools, report);
    }
    if let Some(ids) = &room.sequence_ids {
        for &id in ids {
            tally(report, (id as usize) < pools.sequences);
        }
    }

    // Instance IDs resolve against the room's own instance list, not a
    // global pool.
    let by_instance_id: HashMap<u32, usize> = room
        .instances
        .iter()
        .enumerate()
        .map(|(i, obj)| (obj.instance_id, i))
        .collect();

    if let Some(layers) = &mut room.layers {
        for layer in layers {
            match &mut layer.payload {
                LayerPayload::Instances(data) => {
                    data.resolved = data
                        .instance_ids
                        .iter()
                        .map(|&id| match by_instance_id.get(&id) {
                            Some(&i) => {
                                report.resolved += 1;
                                ResolvedInstance::Placed(i)
                            }
                            None => {
                                log::warn!(
                                    "instance id {id} has no matching object; \
                                     synthesizing nonexistent placeholder"
                                );
                                report.placeholders += 1;
                                ResolvedInstance::Placeholder(GameObject::nonexistent(id))
                            }
                        })
                        .collect();
                }
                LayerPayload::Background(bg) => {
                    tally(report, bg.sprite.bind(pools.sprites));
                }
                LayerPayload::Tiles(tiles) => {
                    tally(report, tiles.tileset.bind(pools.tilesets));
                }
                LayerPayload::Assets(assets) => {
                    for tile in &mut assets.legacy_tiles {
                        resolve_tile(tile, pools, report);
                    }
                    for s in &mut assets.sprites {
                        tally(report, s.sprite.bind(pools.sprites));
                    }
                    if let Some(seqs) = &mut assets.sequences {
                        for s in seqs {
                            tally(report, s.sequence.bind(pools.sequences));
                        }
                    }
                    if let Some(slices) = &mut assets.nine_slices {
                        for s in slices {
                            tally(report, s.sprite.bind(pools.sprites));
                        }
                    }
                }
                LayerPayload::Path | LayerPayload::Path2 | LayerPayload::Effect(_) => {}
            }
        }
    }
}

fn resolve_game_object(obj: &mut GameObject, pools: &PoolSizes, report: &mut ResolutionReport) {
    tally(report, obj.object.bind(pools.objects));
    tally(report, obj.creation_code.bind(pools.code));
    if let Some(pre) = &mut obj.pre_create_code {
        tally(report, pre.bind(pools.code));
    }
}

fn resolve_tile(
    tile: &mut crate::chunks::room::LegacyTile,
    pools: &PoolSizes,
    report: &mut ResolutionReport,
) {
    use crate::chunks::room::TileDefinition;
    match &mut tile.definition {
        TileDefinition::Sprite(r) => tally(report, r.bind(pools.sprites)),
        TileDefinition::Tileset(r) => tally(report, r.bind(pools.tilesets)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunks::room::{InstancesData, Layer, LayerPayload, Room, RoomFlags, RoomId};
    use crate::pools::ObjectRef;
    use crate::strings::StringRef;

    fn modern_room_with_ids(ids: &[u32], instance_ids: &[u32]) -> Room {
        let mut room = Room::empty(
            StringRef::NONE,
            RoomFlags(RoomFlags::ENGINE_V2 | RoomFlags::ENABLE_VIEWS),
        );
        for &id in instance_ids {
            let mut obj = crate::chunks::room::GameObject::nonexistent(id);
            obj.nonexistent = false;
            obj.object = ObjectRef::from_id(0);
            room.instances.push(obj);
        }
        room.layers.as_mut().unwrap().push(Layer {
            owner: RoomId(0),
            name: StringRef::NONE,
            id: 1,
            depth: 0,
            x_offset: 0.0,
            y_offset: 0.0,
            h_speed: 0.0,
            v_speed: 0.0,
            visible: true,
            effect: None,
            payload: LayerPayload::Instances(InstancesData {
                instance_ids: ids.to_vec(),
                resolved: Vec::new(),
            }),
        });
        room
    }

    #[test]
    fn dangling_instance_id_becomes_placeholder() {
        let mut room = modern_room_with_ids(&[100_001, 100_777], &[100_001]);
        let pools = PoolSizes {
            objects: 1,
            ..Default::default()
        };
        let report = resolve_rooms(std::slice::from_mut(&mut room), &pools);
        assert_eq!(report.placeholders, 1);

        let layers = room.layers.as_ref().unwrap();
        let LayerPayload::Instances(data) = &layers[0].payload else {
            panic!("expected instances payload");
        };
        assert_eq!(data.resolved.len(), 2);
        assert!(matches!(data.resolved[0], ResolvedInstance::Placed(0)));
        match &data.resolved[1] {
            ResolvedInstance::Placeholder(obj) => {
                assert!(obj.nonexistent);
                assert_eq!(obj.instance_id, 100_777);
            }
            other => panic!("expected placeholder, got {other:?}"),
        }
        // Raw IDs are untouched for write-back.
        assert_eq!(data.instance_ids, vec![100_001, 100_777]);
    }

    #[test]
    fn out_of_range_ref_stays_unresolved() {
        let mut room = modern_room_with_ids(&[], &[5]);
        room.instances[0].object = ObjectRef::from_id(42);
        let pools = PoolSizes {
            objects: 3,
            ..Default::default()
        };
        let report = resolve_rooms(std::slice::from_mut(&mut room), &pools);
        assert!(report.unresolved > 0);
        assert_eq!(room.instances[0].object.resolved(), None);
    }
}
