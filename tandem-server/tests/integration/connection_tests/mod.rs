mod test_silent_peer_is_dropped;
