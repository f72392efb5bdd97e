fn main() {
    vid_sv::run();
}
