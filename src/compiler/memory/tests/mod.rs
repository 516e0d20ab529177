mod frame_size;
