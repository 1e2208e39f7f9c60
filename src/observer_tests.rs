// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_subst_info_is_not_final_or_empty() {
    let info = SubstInfo::default();
    assert!(!info.is_final);
    assert!(!info.is_empty);
    assert_eq!(info.sps, SubstProcState::Undefined);
}

#[test]
fn is_at_src_loc_requires_matching_location() {
    let mut info = SubstInfo { loc_id: Some("LP1".into()), link_to_src: Some("LP1".into()), ..SubstInfo::default() };
    assert!(info.is_at_src_loc());
    info.loc_id = Some("LP2".into());
    assert!(!info.is_at_src_loc());
}

#[test]
fn is_at_dest_loc_false_when_unset() {
    let info = SubstInfo::default();
    assert!(!info.is_at_dest_loc());
}

#[test]
fn update_item_subst_id_accessor() {
    let id = SubstrateId::from_name("W1");
    let item = UpdateItem::SyncExternal { subst_id: id.clone() };
    assert_eq!(item.subst_id(), &id);
}

#[test]
fn update_behavior_flags_combine() {
    let behavior = UpdateBehavior::STANDARD_SPS_UPDATE | UpdateBehavior::BASIC_SPS_LISTS;
    assert!(behavior.contains(UpdateBehavior::STANDARD_SPS_UPDATE));
    assert!(behavior.contains(UpdateBehavior::BASIC_SPS_LISTS));
    assert!(!behavior.contains(UpdateBehavior::PENDING_SPS_UPDATE));
}
