mod test_cache_invalidation;
mod test_cache_replay_order;
mod test_malformed_frame_is_dropped;
